use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use serde::Serialize;

use backoffice::AppContext;
use backoffice::models::auth::MenuItem;

use super::{check, print_json};

#[derive(Subcommand)]
pub enum AuthCommands {
    Login(LoginArgs),
    Logout,
    Whoami,
    /// Reissue the token so permission changes apply
    Refresh,
    /// Navigation entries visible to the current user
    Menu,
    /// Check one permission code
    Can(CanArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, help = "Email address for the account")]
    email: String,
    #[arg(long, help = "Password for the account")]
    password: String,
}

#[derive(Args)]
pub struct CanArgs {
    #[arg(help = "Permission code, e.g. requerimientos.aprobar")]
    code: String,
}

#[derive(Serialize)]
struct WhoamiOutput {
    id: i64,
    name: String,
    email: String,
    rol: String,
    empresa_id: i64,
    locales: Vec<i64>,
    permisos: Vec<String>,
    expires_at: Option<String>,
}

pub async fn handle(ctx: &AppContext, command: AuthCommands, json: bool) -> Result<()> {
    match command {
        AuthCommands::Login(args) => {
            let identity = check(ctx, ctx.session.login(&args.email, &args.password).await)?;
            if json {
                print_json(&whoami(&identity))?;
            } else {
                println!(
                    "Bienvenido, {} ({})",
                    identity.display_name(),
                    identity.claims.rol
                );
            }
        }
        AuthCommands::Logout => {
            check(ctx, ctx.session.logout())?;
            println!("Sesión cerrada. Inicia sesión nuevamente con `backoffice auth login`.");
        }
        AuthCommands::Whoami => {
            let identity = ctx
                .session
                .identity()
                .ok_or_else(|| anyhow!("No hay una sesión activa."))?;
            if json {
                print_json(&whoami(&identity))?;
            } else {
                let out = whoami(&identity);
                println!("{} <{}>", out.name, out.email);
                println!("Rol: {}", out.rol);
                println!("Locales: {:?}", out.locales);
                println!("Permisos: {}", out.permisos.join(", "));
                if let Some(exp) = out.expires_at {
                    println!("Expira: {}", exp);
                }
            }
        }
        AuthCommands::Refresh => {
            check(ctx, ctx.require_session())?;
            let identity = check(ctx, ctx.session.refresh().await)?;
            if json {
                print_json(&whoami(&identity))?;
            } else {
                println!(
                    "Permisos actualizados: {} permiso(s)",
                    identity.claims.permisos.len()
                );
            }
        }
        AuthCommands::Menu => {
            check(ctx, ctx.require_session())?;
            let menu = check(ctx, ctx.session.menu().await)?;
            if json {
                print_json(&menu)?;
            } else {
                print_menu(&menu, 0);
            }
        }
        AuthCommands::Can(args) => {
            let allowed = ctx.session.has_permission(&args.code);
            if json {
                print_json(&serde_json::json!({ "code": args.code, "allowed": allowed }))?;
            } else {
                println!("{}: {}", args.code, if allowed { "sí" } else { "no" });
            }
        }
    }
    Ok(())
}

fn whoami(identity: &backoffice::services::Identity) -> WhoamiOutput {
    let claims = &identity.claims;
    WhoamiOutput {
        id: claims.sub,
        name: identity.display_name().to_string(),
        email: claims.email.clone(),
        rol: claims.rol.clone(),
        empresa_id: claims.empresa_id,
        locales: claims.locales.clone(),
        permisos: claims.permisos.clone(),
        expires_at: claims
            .exp
            .and_then(|ts| chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339()),
    }
}

fn print_menu(items: &[MenuItem], depth: usize) {
    for item in items {
        let route = item.ruta.as_deref().unwrap_or("");
        println!("{}{} {}", "  ".repeat(depth), item.titulo, route);
        print_menu(&item.hijos, depth + 1);
    }
}
