//! Command-line front end: one subcommand group per back-office screen.

use anyhow::{Result, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use backoffice::domain::{ApiError, PageRequest, Paginated, Resource};
use backoffice::services::listing::SortDirection;
use backoffice::services::{Column, EntityForm, PagedList, SubmitOutcome};
use backoffice::AppContext;

mod admin;
mod auth;
mod catalog;
mod inventory;

#[derive(Parser)]
#[command(name = "backoffice", about = "Back-office client for stores, inventory and purchasing", version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(auth::AuthCommands),
    #[command(subcommand)]
    Locales(admin::LocalesCommands),
    #[command(subcommand)]
    Usuarios(admin::UsuariosCommands),
    #[command(subcommand)]
    Roles(admin::RolesCommands),
    #[command(subcommand)]
    Permisos(admin::PermisosCommands),
    #[command(subcommand)]
    Categorias(catalog::CategoriasCommands),
    #[command(subcommand)]
    Unidades(catalog::UnidadesCommands),
    #[command(subcommand)]
    Productos(catalog::ProductosCommands),
    #[command(subcommand)]
    Proveedores(catalog::ProveedoresCommands),
    #[command(subcommand)]
    Requerimientos(inventory::RequerimientosCommands),
    #[command(subcommand)]
    Entradas(inventory::EntradasCommands),
}

pub async fn run(ctx: &AppContext, cli: Cli) -> Result<()> {
    let json = cli.json;
    if !matches!(cli.command, Commands::Auth(_)) {
        check(ctx, ctx.require_session())?;
    }

    match cli.command {
        Commands::Auth(command) => auth::handle(ctx, command, json).await,
        Commands::Locales(command) => admin::handle_locales(ctx, command, json).await,
        Commands::Usuarios(command) => admin::handle_usuarios(ctx, command, json).await,
        Commands::Roles(command) => admin::handle_roles(ctx, command, json).await,
        Commands::Permisos(command) => admin::handle_permisos(ctx, command, json).await,
        Commands::Categorias(command) => catalog::handle_categorias(ctx, command, json).await,
        Commands::Unidades(command) => catalog::handle_unidades(ctx, command, json).await,
        Commands::Productos(command) => catalog::handle_productos(ctx, command, json).await,
        Commands::Proveedores(command) => catalog::handle_proveedores(ctx, command, json).await,
        Commands::Requerimientos(command) => inventory::handle_requerimientos(ctx, command, json).await,
        Commands::Entradas(command) => inventory::handle_entradas(ctx, command, json).await,
    }
}

/// Marker for failures already shown to the operator as a notice.
#[derive(Debug, thiserror::Error)]
#[error("already reported")]
pub struct Reported;

pub fn is_reported(error: &anyhow::Error) -> bool {
    error.downcast_ref::<Reported>().is_some()
}

/// Turn a service error into a CLI error, logging out on an expired session.
pub(crate) fn check<T>(ctx: &AppContext, result: Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| {
        ctx.expire_if_needed(&e);
        anyhow!(e.user_message())
    })
}

#[derive(Args, Clone)]
pub(crate) struct ListArgs {
    #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
    page: u64,
    #[arg(long, help = "Rows per page (defaults to PAGE_SIZE)")]
    limit: Option<u64>,
    #[arg(long, help = "Free-text search")]
    search: Option<String>,
    #[arg(long, help = "Column key to sort the current page by")]
    sort: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "Sort descending")]
    desc: bool,
}

pub(crate) async fn list_resource<R: Resource>(
    ctx: &AppContext,
    args: &ListArgs,
    filters: &[(&str, String)],
    columns: &[Column<R::Model>],
    json: bool,
) -> Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.page_size);
    let mut request =
        PageRequest::new(args.page, limit).with_search(args.search.clone().unwrap_or_default());
    for (key, value) in filters {
        request = request.with_filter(*key, value.clone());
    }

    let mut list = PagedList::new(ctx.manager::<R>(), ctx.notifier.clone(), limit).with_request(request);
    if !list.refresh().await {
        if let Some(e) = list.last_error() {
            ctx.expire_if_needed(e);
        }
        return Err(Reported.into());
    }

    if let Some(key) = &args.sort {
        let column = columns
            .iter()
            .find(|c| c.key == key.as_str())
            .copied()
            .ok_or_else(|| {
                let keys: Vec<&str> = columns.iter().map(|c| c.key).collect();
                anyhow!("Columna desconocida '{}'. Disponibles: {}", key, keys.join(", "))
            })?;
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        list.sort_with(column, direction);
    }

    if json {
        print_json(&Paginated {
            data: list.rows().to_vec(),
            meta: list.meta().clone(),
        })
    } else {
        println!("{}", list.view(columns));
        Ok(())
    }
}

/// Submit a create/edit form through the CRUD page, so the list is refetched.
pub(crate) async fn submit<R: Resource>(ctx: &AppContext, form: EntityForm<R>, json: bool) -> Result<()> {
    let mut page = ctx.crud::<R>();
    match page.submit(&form).await {
        SubmitOutcome::Saved(model) => {
            if json {
                print_json(&model)?;
            } else {
                println!(
                    "{} #{} guardado. Total de {} registro(s).",
                    R::LABEL,
                    R::id(&model),
                    page.list().total()
                );
            }
            Ok(())
        }
        SubmitOutcome::Rejected(e) => Err(rejected(ctx, e)),
    }
}

pub(crate) async fn delete<R: Resource>(ctx: &AppContext, id: i64) -> Result<()> {
    let mut page = ctx.crud::<R>();
    match page.delete(id).await {
        Ok(()) => {
            println!("Total de {} registro(s).", page.list().total());
            Ok(())
        }
        Err(e) => {
            ctx.expire_if_needed(&e);
            Err(Reported.into())
        }
    }
}

fn rejected(ctx: &AppContext, error: ApiError) -> anyhow::Error {
    if error.is_inline() {
        anyhow!(error.user_message())
    } else {
        ctx.expire_if_needed(&error);
        Reported.into()
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

pub(crate) fn parse_positive_f64(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{raw}'"))?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err("value must be greater than zero".to_string())
    }
}

/// `producto:unidad:cantidad[:precio]`
pub(crate) fn parse_item(raw: &str) -> Result<(i64, i64, f64, Option<f64>), String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(format!(
            "invalid item '{raw}', expected producto:unidad:cantidad[:precio]"
        ));
    }
    let producto: i64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid product id '{}'", parts[0]))?;
    let unidad: i64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid unit id '{}'", parts[1]))?;
    let cantidad = parse_positive_f64(parts[2])?;
    let precio = match parts.get(3) {
        Some(p) => Some(
            p.parse::<f64>()
                .map_err(|_| format!("invalid price '{p}'"))?,
        ),
        None => None,
    };
    Ok((producto, unidad, cantidad, precio))
}
