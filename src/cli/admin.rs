//! Company administration: stores, users, roles and permissions.

use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};

use backoffice::AppContext;
use backoffice::models::local::{CreateLocalDto, Local, UpdateLocalDto};
use backoffice::models::permiso::group_by_module;
use backoffice::models::rol::Rol;
use backoffice::models::usuario::{CreateUsuarioDto, UpdateUsuarioDto, Usuario};
use backoffice::models::{Locales, Roles, Usuarios};
use backoffice::services::{CellValue, Column, EntityForm};

use super::{ListArgs, check, list_resource, normalize_optional_string, print_json, submit};

#[derive(Subcommand)]
pub enum LocalesCommands {
    List(ListArgs),
    Create(CreateLocalArgs),
    Update(UpdateLocalArgs),
}

#[derive(Args)]
pub struct CreateLocalArgs {
    #[arg(long)]
    nombre: String,
    #[arg(long, help = "Short store code, e.g. CEN-01")]
    codigo: String,
    #[arg(long, action = ArgAction::SetTrue, help = "The store serves tables")]
    tiene_mesas: bool,
    #[arg(long)]
    direccion: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
}

#[derive(Args)]
pub struct UpdateLocalArgs {
    id: i64,
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    codigo: Option<String>,
    #[arg(long)]
    tiene_mesas: Option<bool>,
    #[arg(long)]
    direccion: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    activo: Option<bool>,
}

fn local_columns() -> Vec<Column<Local>> {
    type C = Column<Local>;
    vec![
        C::new("id", "ID", |l: &Local| CellValue::Int(l.id)),
        C::new("codigo", "Código", |l: &Local| CellValue::text(l.codigo.as_str())),
        C::new("nombre", "Nombre", |l: &Local| CellValue::text(l.nombre.as_str())),
        C::new("mesas", "Mesas", |l: &Local| CellValue::Bool(l.tiene_mesas)),
        C::new("direccion", "Dirección", |l: &Local| {
            CellValue::opt_text(l.direccion.as_deref())
        }),
    ]
}

pub async fn handle_locales(ctx: &AppContext, command: LocalesCommands, json: bool) -> Result<()> {
    match command {
        LocalesCommands::List(args) => {
            list_resource::<Locales>(ctx, &args, &[], &local_columns(), json).await
        }
        LocalesCommands::Create(args) => {
            let dto = CreateLocalDto {
                nombre: args.nombre,
                codigo: args.codigo,
                tiene_mesas: args.tiene_mesas,
                direccion: normalize_optional_string(args.direccion),
                telefono: normalize_optional_string(args.telefono),
            };
            submit(ctx, EntityForm::<Locales>::create(dto), json).await
        }
        LocalesCommands::Update(args) => {
            let dto = UpdateLocalDto {
                nombre: args.nombre,
                codigo: args.codigo,
                tiene_mesas: args.tiene_mesas,
                direccion: normalize_optional_string(args.direccion),
                telefono: normalize_optional_string(args.telefono),
                activo: args.activo,
            };
            submit(ctx, EntityForm::<Locales>::edit(args.id, dto), json).await
        }
    }
}

#[derive(Subcommand)]
pub enum UsuariosCommands {
    List(ListArgs),
    Create(CreateUsuarioArgs),
    Update(UpdateUsuarioArgs),
    /// Replace the stores the user works in
    AsignarLocales(AsignarLocalesArgs),
    /// Roles and stores available in the user form
    Opciones,
}

#[derive(Args)]
pub struct CreateUsuarioArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    rol_id: i64,
    #[arg(long = "local", help = "Store id; repeat for several stores")]
    locales: Vec<i64>,
    #[arg(long)]
    telefono: Option<String>,
}

#[derive(Args)]
pub struct UpdateUsuarioArgs {
    id: i64,
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    rol_id: Option<i64>,
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    activo: Option<bool>,
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args)]
pub struct AsignarLocalesArgs {
    id: i64,
    #[arg(long = "local", help = "Store id; repeat for several stores")]
    locales: Vec<i64>,
}

fn usuario_columns() -> Vec<Column<Usuario>> {
    type C = Column<Usuario>;
    vec![
        C::new("id", "ID", |u: &Usuario| CellValue::Int(u.id)),
        C::new("nombre", "Nombre", |u: &Usuario| {
            CellValue::text(u.nombre_completo.as_str())
        }),
        C::new("email", "Email", |u: &Usuario| CellValue::text(u.email.as_str())),
        C::new("rol", "Rol", |u: &Usuario| CellValue::text(u.rol.as_str())),
        C::new("locales", "Locales", |u: &Usuario| {
            let names: Vec<&str> = u.locales.iter().map(|l| l.nombre.as_str()).collect();
            CellValue::text(names.join(", "))
        })
        .unsortable(),
        C::new("activo", "Activo", |u: &Usuario| CellValue::Bool(u.activo)),
    ]
}

pub async fn handle_usuarios(ctx: &AppContext, command: UsuariosCommands, json: bool) -> Result<()> {
    match command {
        UsuariosCommands::List(args) => {
            list_resource::<Usuarios>(ctx, &args, &[], &usuario_columns(), json).await
        }
        UsuariosCommands::Create(args) => {
            let dto = CreateUsuarioDto {
                email: args.email.trim().to_string(),
                password: args.password,
                nombre_completo: args.nombre,
                rol_id: args.rol_id,
                locales_ids: args.locales,
                telefono: normalize_optional_string(args.telefono),
            };
            submit(ctx, EntityForm::<Usuarios>::create(dto), json).await
        }
        UsuariosCommands::Update(args) => {
            let dto = UpdateUsuarioDto {
                nombre_completo: args.nombre,
                rol_id: args.rol_id,
                telefono: normalize_optional_string(args.telefono),
                activo: args.activo,
                password: normalize_optional_string(args.password),
            };
            submit(ctx, EntityForm::<Usuarios>::edit(args.id, dto), json).await
        }
        UsuariosCommands::AsignarLocales(args) => {
            let count = args.locales.len();
            check(ctx, ctx.usuarios().assign_locales(args.id, args.locales).await)?;
            println!("Usuario #{} asignado a {} local(es)", args.id, count);
            Ok(())
        }
        UsuariosCommands::Opciones => {
            let (roles, locales) = check(ctx, ctx.usuarios().form_options().await)?;
            if json {
                print_json(&serde_json::json!({ "roles": roles, "locales": locales }))
            } else {
                println!("Roles:");
                for r in &roles {
                    println!("  {:>4}  {}", r.id, r.nombre);
                }
                println!("Locales:");
                for l in &locales {
                    println!("  {:>4}  {} ({})", l.id, l.nombre, l.codigo);
                }
                Ok(())
            }
        }
    }
}

#[derive(Subcommand)]
pub enum RolesCommands {
    List(ListArgs),
    Create(CreateRolArgs),
    /// Replace the role's permissions by code
    Permisos(RolPermisosArgs),
    /// Which menu entries the role can see
    Menu(RolMenuArgs),
}

#[derive(Args)]
pub struct CreateRolArgs {
    #[arg(long)]
    nombre: String,
}

#[derive(Args)]
pub struct RolPermisosArgs {
    id: i64,
    #[arg(long = "codigo", help = "Permission code; repeat for several")]
    codigos: Vec<String>,
}

#[derive(Args)]
pub struct RolMenuArgs {
    id: i64,
}

fn rol_columns() -> Vec<Column<Rol>> {
    type C = Column<Rol>;
    vec![
        C::new("id", "ID", |r: &Rol| CellValue::Int(r.id)),
        C::new("nombre", "Nombre", |r: &Rol| CellValue::text(r.nombre.as_str())),
        C::new("sistema", "Sistema", |r: &Rol| CellValue::Bool(r.es_sistema)),
        C::new("permisos", "Permisos", |r: &Rol| {
            CellValue::Int(r.active_permission_ids().len() as i64)
        }),
    ]
}

pub async fn handle_roles(ctx: &AppContext, command: RolesCommands, json: bool) -> Result<()> {
    match command {
        RolesCommands::List(args) => list_resource::<Roles>(ctx, &args, &[], &rol_columns(), json).await,
        RolesCommands::Create(args) => {
            let rol = check(ctx, ctx.roles().create_rol(&args.nombre).await)?;
            if json {
                print_json(&rol)
            } else {
                println!("Rol '{}' creado (#{})", rol.nombre, rol.id);
                Ok(())
            }
        }
        RolesCommands::Permisos(args) => {
            let rol = check(
                ctx,
                ctx.roles()
                    .assign_permission_codes(args.id, &args.codigos)
                    .await,
            )?;
            if json {
                print_json(&rol)
            } else {
                let codes: Vec<String> = rol.active_permission_codes().into_iter().collect();
                println!("Rol '{}': {}", rol.nombre, codes.join(", "));
                println!("Los usuarios con este rol deben ejecutar `backoffice auth refresh`.");
                Ok(())
            }
        }
        RolesCommands::Menu(args) => {
            if !ctx.session.is_owner() {
                tracing::warn!("Menu matrix limited to the entries visible to the current operator");
            }
            let rows = check(ctx, ctx.roles().role_menu_matrix(args.id).await)?;
            if json {
                print_json(&rows)
            } else {
                for row in &rows {
                    let mark = if row.visible { "[x]" } else { "[ ]" };
                    let permiso = row.permiso.as_deref().unwrap_or("público");
                    println!("{}{} {} ({})", "  ".repeat(row.depth), mark, row.titulo, permiso);
                }
                Ok(())
            }
        }
    }
}

#[derive(Subcommand)]
pub enum PermisosCommands {
    /// Permission catalogue grouped by module
    List,
}

pub async fn handle_permisos(ctx: &AppContext, command: PermisosCommands, json: bool) -> Result<()> {
    match command {
        PermisosCommands::List => {
            let permisos = check(ctx, ctx.roles().list_permisos().await)?;
            let groups = group_by_module(&permisos);
            if json {
                return print_json(&groups);
            }
            for (modulo, permisos) in &groups {
                println!("{}:", modulo);
                for p in permisos {
                    println!("  {:>4}  {:<32} {}", p.id, p.codigo, p.nombre);
                }
            }
            Ok(())
        }
    }
}
