//! Catalogue maintenance: categories, units of measure, products and suppliers.

use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};

use backoffice::AppContext;
use backoffice::models::categoria::{Categoria, CrearCategoriaDto, EditarCategoriaDto};
use backoffice::models::producto::{CrearProductoDto, EditarProductoDto, Producto, ProductoUnidadDto};
use backoffice::models::proveedor::{CrearProveedorDto, EditarProveedorDto, Proveedor};
use backoffice::models::unidad::{CrearUnidadDto, EditarUnidadDto, TipoUnidad, UnidadMedida};
use backoffice::models::{Categorias, Productos, Proveedores, Unidades};
use backoffice::services::{CellValue, Column, EntityForm};

use super::{ListArgs, check, delete, list_resource, normalize_optional_string, print_json, submit};

#[derive(Subcommand)]
pub enum CategoriasCommands {
    List(ListArgs),
    Create(CreateCategoriaArgs),
    Update(UpdateCategoriaArgs),
    Delete { id: i64 },
}

#[derive(Args)]
pub struct CreateCategoriaArgs {
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    descripcion: Option<String>,
}

#[derive(Args)]
pub struct UpdateCategoriaArgs {
    id: i64,
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    descripcion: Option<String>,
    #[arg(long)]
    activo: Option<bool>,
}

fn categoria_columns() -> Vec<Column<Categoria>> {
    type C = Column<Categoria>;
    vec![
        C::new("id", "ID", |c: &Categoria| CellValue::Int(c.id)),
        C::new("nombre", "Nombre", |c: &Categoria| CellValue::text(c.nombre.as_str())),
        C::new("descripcion", "Descripción", |c: &Categoria| {
            CellValue::opt_text(c.descripcion.as_deref())
        }),
        C::new("activo", "Activo", |c: &Categoria| CellValue::Bool(c.activo)),
    ]
}

pub async fn handle_categorias(ctx: &AppContext, command: CategoriasCommands, json: bool) -> Result<()> {
    match command {
        CategoriasCommands::List(args) => {
            list_resource::<Categorias>(ctx, &args, &[], &categoria_columns(), json).await
        }
        CategoriasCommands::Create(args) => {
            let dto = CrearCategoriaDto {
                nombre: args.nombre,
                descripcion: normalize_optional_string(args.descripcion),
            };
            submit(ctx, EntityForm::<Categorias>::create(dto), json).await
        }
        CategoriasCommands::Update(args) => {
            let dto = EditarCategoriaDto {
                nombre: args.nombre,
                descripcion: normalize_optional_string(args.descripcion),
                activo: args.activo,
            };
            submit(ctx, EntityForm::<Categorias>::edit(args.id, dto), json).await
        }
        CategoriasCommands::Delete { id } => delete::<Categorias>(ctx, id).await,
    }
}

#[derive(Subcommand)]
pub enum UnidadesCommands {
    List(ListArgs),
    Create(CreateUnidadArgs),
    Update(UpdateUnidadArgs),
    Delete { id: i64 },
}

#[derive(Args)]
pub struct CreateUnidadArgs {
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    abreviatura: String,
    #[arg(long, help = "peso, volumen or cantidad")]
    tipo: TipoUnidad,
    #[arg(long, action = ArgAction::SetTrue, help = "This is the base unit of its type")]
    es_base: bool,
    #[arg(long, help = "Base unit this one converts to")]
    unidad_base_id: Option<i64>,
    #[arg(long, help = "How many base units one of these holds")]
    factor: Option<f64>,
}

#[derive(Args)]
pub struct UpdateUnidadArgs {
    id: i64,
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    abreviatura: Option<String>,
    #[arg(long)]
    tipo: Option<TipoUnidad>,
    #[arg(long)]
    es_base: Option<bool>,
    #[arg(long)]
    unidad_base_id: Option<i64>,
    #[arg(long)]
    factor: Option<f64>,
    #[arg(long)]
    activo: Option<bool>,
}

fn unidad_columns() -> Vec<Column<UnidadMedida>> {
    type C = Column<UnidadMedida>;
    vec![
        C::new("id", "ID", |u: &UnidadMedida| CellValue::Int(u.id)),
        C::new("nombre", "Nombre", |u: &UnidadMedida| CellValue::text(u.nombre.as_str())),
        C::new("abreviatura", "Abrev.", |u: &UnidadMedida| {
            CellValue::text(u.abreviatura.as_str())
        }),
        C::new("tipo", "Tipo", |u: &UnidadMedida| CellValue::text(u.tipo.to_string())),
        C::new("base", "Base", |u: &UnidadMedida| CellValue::Bool(u.es_base)),
        C::new("factor", "Factor", |u: &UnidadMedida| match u.factor_a_base {
            Some(f) => CellValue::Number(f),
            None => CellValue::Empty,
        }),
    ]
}

pub async fn handle_unidades(ctx: &AppContext, command: UnidadesCommands, json: bool) -> Result<()> {
    match command {
        UnidadesCommands::List(args) => {
            list_resource::<Unidades>(ctx, &args, &[], &unidad_columns(), json).await
        }
        UnidadesCommands::Create(args) => {
            let dto = CrearUnidadDto {
                nombre: args.nombre,
                abreviatura: args.abreviatura,
                tipo: args.tipo,
                es_base: args.es_base,
                unidad_base_id: if args.es_base { None } else { args.unidad_base_id },
                factor_a_base: if args.es_base { None } else { args.factor },
            };
            submit(ctx, EntityForm::<Unidades>::create(dto), json).await
        }
        UnidadesCommands::Update(args) => {
            let dto = EditarUnidadDto {
                nombre: args.nombre,
                abreviatura: args.abreviatura,
                tipo: args.tipo,
                es_base: args.es_base,
                unidad_base_id: args.unidad_base_id,
                factor_a_base: args.factor,
                activo: args.activo,
            };
            submit(ctx, EntityForm::<Unidades>::edit(args.id, dto), json).await
        }
        UnidadesCommands::Delete { id } => delete::<Unidades>(ctx, id).await,
    }
}

#[derive(Subcommand)]
pub enum ProductosCommands {
    List(ListArgs),
    Create(CreateProductoArgs),
    Update(UpdateProductoArgs),
    Delete { id: i64 },
    /// Units a product can be requested and received in
    Unidades { id: i64 },
}

#[derive(Args)]
pub struct CreateProductoArgs {
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    codigo: Option<String>,
    #[arg(long)]
    codigo_barras: Option<String>,
    #[arg(long)]
    descripcion: Option<String>,
    #[arg(long)]
    categoria_id: Option<i64>,
    #[arg(long)]
    stock_minimo: Option<f64>,
    #[arg(long, help = "Base unit of measure id")]
    unidad_base: i64,
    #[arg(long = "unidad", help = "Additional unit id; repeat for several")]
    unidades: Vec<i64>,
}

#[derive(Args)]
pub struct UpdateProductoArgs {
    id: i64,
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    codigo: Option<String>,
    #[arg(long)]
    codigo_barras: Option<String>,
    #[arg(long)]
    descripcion: Option<String>,
    #[arg(long)]
    categoria_id: Option<i64>,
    #[arg(long)]
    stock_minimo: Option<f64>,
    #[arg(long)]
    activo: Option<bool>,
}

fn producto_columns() -> Vec<Column<Producto>> {
    type C = Column<Producto>;
    vec![
        C::new("id", "ID", |p: &Producto| CellValue::Int(p.id)),
        C::new("codigo", "Código", |p: &Producto| CellValue::opt_text(p.codigo.as_deref())),
        C::new("nombre", "Nombre", |p: &Producto| CellValue::text(p.nombre.as_str())),
        C::new("categoria", "Categoría", |p: &Producto| match p.categoria_id {
            Some(id) => CellValue::Int(id),
            None => CellValue::Empty,
        }),
        C::new("stock_minimo", "Stock mín.", |p: &Producto| CellValue::Number(p.stock_minimo)),
        C::new("activo", "Activo", |p: &Producto| CellValue::Bool(p.activo)),
    ]
}

pub async fn handle_productos(ctx: &AppContext, command: ProductosCommands, json: bool) -> Result<()> {
    match command {
        ProductosCommands::List(args) => {
            list_resource::<Productos>(ctx, &args, &[], &producto_columns(), json).await
        }
        ProductosCommands::Create(args) => {
            let mut unidades = vec![ProductoUnidadDto {
                unidad_medida_id: args.unidad_base,
                es_unidad_base: true,
            }];
            unidades.extend(
                args.unidades
                    .into_iter()
                    .filter(|id| *id != args.unidad_base)
                    .map(|id| ProductoUnidadDto {
                        unidad_medida_id: id,
                        es_unidad_base: false,
                    }),
            );
            let dto = CrearProductoDto {
                codigo: normalize_optional_string(args.codigo),
                codigo_barras: normalize_optional_string(args.codigo_barras),
                nombre: args.nombre,
                descripcion: normalize_optional_string(args.descripcion),
                categoria_id: args.categoria_id,
                stock_minimo: args.stock_minimo,
                unidades,
            };
            submit(ctx, EntityForm::<Productos>::create(dto), json).await
        }
        ProductosCommands::Update(args) => {
            let dto = EditarProductoDto {
                codigo: normalize_optional_string(args.codigo),
                codigo_barras: normalize_optional_string(args.codigo_barras),
                nombre: args.nombre,
                descripcion: normalize_optional_string(args.descripcion),
                categoria_id: args.categoria_id,
                stock_minimo: args.stock_minimo,
                activo: args.activo,
            };
            submit(ctx, EntityForm::<Productos>::edit(args.id, dto), json).await
        }
        ProductosCommands::Delete { id } => delete::<Productos>(ctx, id).await,
        ProductosCommands::Unidades { id } => {
            let units = check(ctx, ctx.unit_cache.units_for(id).await)?;
            if json {
                return print_json(&units);
            }
            if units.is_empty() {
                println!("El producto #{} no tiene unidades configuradas.", id);
            }
            for unit in &units {
                let base = if unit.es_unidad_base { " (base)" } else { "" };
                println!("  {:>4}  {}{}", unit.unidad_medida_id, unit.label(), base);
            }
            Ok(())
        }
    }
}

#[derive(Subcommand)]
pub enum ProveedoresCommands {
    List(ListArgs),
    Create(CreateProveedorArgs),
    Update(UpdateProveedorArgs),
    Delete { id: i64 },
}

#[derive(Args)]
pub struct CreateProveedorArgs {
    #[arg(long)]
    ruc: String,
    #[arg(long)]
    razon_social: String,
    #[arg(long)]
    nombre_comercial: Option<String>,
    #[arg(long)]
    direccion: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    contacto_nombre: Option<String>,
    #[arg(long)]
    contacto_telefono: Option<String>,
}

#[derive(Args)]
pub struct UpdateProveedorArgs {
    id: i64,
    #[arg(long)]
    ruc: Option<String>,
    #[arg(long)]
    razon_social: Option<String>,
    #[arg(long)]
    nombre_comercial: Option<String>,
    #[arg(long)]
    direccion: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    contacto_nombre: Option<String>,
    #[arg(long)]
    contacto_telefono: Option<String>,
    #[arg(long)]
    activo: Option<bool>,
}

fn proveedor_columns() -> Vec<Column<Proveedor>> {
    type C = Column<Proveedor>;
    vec![
        C::new("id", "ID", |p: &Proveedor| CellValue::Int(p.id)),
        C::new("ruc", "RUC", |p: &Proveedor| CellValue::text(p.ruc.as_str())),
        C::new("razon_social", "Razón social", |p: &Proveedor| {
            CellValue::text(p.razon_social.as_str())
        }),
        C::new("contacto", "Contacto", |p: &Proveedor| {
            CellValue::opt_text(p.contacto_nombre.as_deref())
        }),
        C::new("telefono", "Teléfono", |p: &Proveedor| {
            CellValue::opt_text(p.telefono.as_deref())
        })
        .unsortable(),
        C::new("activo", "Activo", |p: &Proveedor| CellValue::Bool(p.activo)),
    ]
}

pub async fn handle_proveedores(ctx: &AppContext, command: ProveedoresCommands, json: bool) -> Result<()> {
    match command {
        ProveedoresCommands::List(args) => {
            list_resource::<Proveedores>(ctx, &args, &[], &proveedor_columns(), json).await
        }
        ProveedoresCommands::Create(args) => {
            let dto = CrearProveedorDto {
                ruc: args.ruc.trim().to_string(),
                razon_social: args.razon_social,
                nombre_comercial: normalize_optional_string(args.nombre_comercial),
                direccion: normalize_optional_string(args.direccion),
                telefono: normalize_optional_string(args.telefono),
                email: normalize_optional_string(args.email),
                contacto_nombre: normalize_optional_string(args.contacto_nombre),
                contacto_telefono: normalize_optional_string(args.contacto_telefono),
            };
            submit(ctx, EntityForm::<Proveedores>::create(dto), json).await
        }
        ProveedoresCommands::Update(args) => {
            let dto = EditarProveedorDto {
                ruc: normalize_optional_string(args.ruc),
                razon_social: args.razon_social,
                nombre_comercial: normalize_optional_string(args.nombre_comercial),
                direccion: normalize_optional_string(args.direccion),
                telefono: normalize_optional_string(args.telefono),
                email: normalize_optional_string(args.email),
                contacto_nombre: normalize_optional_string(args.contacto_nombre),
                contacto_telefono: normalize_optional_string(args.contacto_telefono),
                activo: args.activo,
            };
            submit(ctx, EntityForm::<Proveedores>::edit(args.id, dto), json).await
        }
        ProveedoresCommands::Delete { id } => delete::<Proveedores>(ctx, id).await,
    }
}
