//! Purchasing and stock intake: requisitions and central warehouse entries.

use anyhow::Result;
use clap::{Args, Subcommand};

use backoffice::AppContext;
use backoffice::models::entrada::{CrearEntradaDto, EntradaCentral, EntradaItemDto, TipoEntrada, round2};
use backoffice::models::requerimiento::{
    AccionRevision, CrearRequerimientoDto, Requerimiento, RequerimientoCompleto, RequerimientoItemDto,
};
use backoffice::models::{Entradas, Requerimientos};
use backoffice::services::requisition_service::RequisitionInput;
use backoffice::services::{CellValue, Column, EntityForm, Notice, ViewMode};

use super::{
    ListArgs, check, list_resource, normalize_optional_string, parse_item, print_json, submit,
};

#[derive(Subcommand)]
pub enum RequerimientosCommands {
    List(RequerimientoListArgs),
    /// Detail with items and the actions offered to you
    Show { id: i64 },
    Create(RequerimientoArgs),
    Edit(EditRequerimientoArgs),
    Delete { id: i64 },
    /// Send a draft to review
    Enviar { id: i64 },
    /// Approve, reject or amend a requisition under review
    Revisar(RevisarArgs),
}

#[derive(Args)]
pub struct RequerimientoListArgs {
    #[command(flatten)]
    list: ListArgs,
    #[arg(long, help = "borrador, revision, aprobado, rechazado, comprado...")]
    estado: Option<String>,
}

#[derive(Args)]
pub struct RequerimientoArgs {
    #[arg(long)]
    observaciones: Option<String>,
    #[arg(
        long = "item",
        value_parser = parse_item,
        help = "producto:unidad:cantidad[:precio]; repeat for several"
    )]
    items: Vec<(i64, i64, f64, Option<f64>)>,
}

#[derive(Args)]
pub struct EditRequerimientoArgs {
    id: i64,
    #[command(flatten)]
    body: RequerimientoArgs,
}

#[derive(Args)]
pub struct RevisarArgs {
    id: i64,
    #[arg(long, value_parser = parse_accion, help = "aprobar, rechazar or guardar")]
    accion: AccionRevision,
    #[arg(long, help = "Approver remarks")]
    observaciones: Option<String>,
    #[arg(
        long = "item",
        value_parser = parse_item,
        help = "Amended item producto:unidad:cantidad[:precio]; replaces all items"
    )]
    items: Vec<(i64, i64, f64, Option<f64>)>,
}

fn parse_accion(raw: &str) -> Result<AccionRevision, String> {
    match raw.trim().to_lowercase().as_str() {
        "aprobar" => Ok(AccionRevision::Aprobar),
        "rechazar" => Ok(AccionRevision::Rechazar),
        "guardar" => Ok(AccionRevision::Guardar),
        other => Err(format!("unknown review action '{other}'")),
    }
}

fn requisition_items(raw: &[(i64, i64, f64, Option<f64>)]) -> Vec<RequerimientoItemDto> {
    raw.iter()
        .map(|&(producto_id, unidad_medida_id, cantidad, precio)| RequerimientoItemDto {
            producto_id,
            unidad_medida_id,
            cantidad,
            precio_unitario_estimado: precio,
            precio_total_estimado: precio.map(|p| round2(p * cantidad)),
            observaciones: None,
        })
        .collect()
}

fn requerimiento_columns() -> Vec<Column<Requerimiento>> {
    type C = Column<Requerimiento>;
    vec![
        C::new("id", "ID", |r: &Requerimiento| CellValue::Int(r.id)),
        C::new("codigo", "Código", |r: &Requerimiento| CellValue::text(r.codigo.as_str())),
        C::new("estado", "Estado", |r: &Requerimiento| CellValue::text(r.estado.as_str())),
        C::new("creado_por", "Creado por", |r: &Requerimiento| CellValue::Int(r.creado_por)),
        C::new("creado_en", "Fecha", |r: &Requerimiento| {
            CellValue::text(short_date(&r.creado_en))
        }),
        C::new("observaciones", "Observaciones", |r: &Requerimiento| {
            CellValue::opt_text(r.observaciones.as_deref())
        })
        .unsortable(),
    ]
}

/// `2026-01-05T10:00:00.000Z` rendered as `05/01/2026`; anything unparsable is shown as is.
fn short_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub async fn handle_requerimientos(
    ctx: &AppContext,
    command: RequerimientosCommands,
    json: bool,
) -> Result<()> {
    let service = ctx.requisitions();
    match command {
        RequerimientosCommands::List(args) => {
            let filters: Vec<(&str, String)> = args
                .estado
                .map(|e| ("estado", e.trim().to_lowercase()))
                .into_iter()
                .collect();
            list_resource::<Requerimientos>(ctx, &args.list, &filters, &requerimiento_columns(), json)
                .await
        }
        RequerimientosCommands::Show { id } => {
            let detail = check(ctx, service.get(id).await)?;
            let actions = service.available_actions(&detail.requerimiento);
            let mode = service.view_mode(&detail.requerimiento);
            if json {
                let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
                return print_json(&serde_json::json!({
                    "requerimiento": detail,
                    "acciones": labels,
                }));
            }
            print_requisition(&detail, mode);
            if actions.is_empty() {
                println!("Sin acciones disponibles.");
            } else {
                let labels: Vec<String> = actions.iter().map(ToString::to_string).collect();
                println!("Acciones: {}", labels.join(" | "));
            }
            Ok(())
        }
        RequerimientosCommands::Create(args) => {
            let dto = CrearRequerimientoDto {
                observaciones: normalize_optional_string(args.observaciones),
                items: requisition_items(&args.items),
            };
            submit(ctx, EntityForm::<Requerimientos>::create(dto), json).await
        }
        RequerimientosCommands::Edit(args) => {
            let detail = check(ctx, service.get(args.id).await)?;
            let input = RequisitionInput {
                observaciones: normalize_optional_string(args.body.observaciones),
                items: (!args.body.items.is_empty()).then(|| requisition_items(&args.body.items)),
            };
            check(ctx, service.edit(&detail.requerimiento, input).await)?;
            done(ctx, format!("Requerimiento {} actualizado", detail.requerimiento.codigo));
            Ok(())
        }
        RequerimientosCommands::Delete { id } => {
            let detail = check(ctx, service.get(id).await)?;
            check(ctx, service.delete(&detail.requerimiento).await)?;
            done(ctx, format!("Requerimiento {} eliminado", detail.requerimiento.codigo));
            Ok(())
        }
        RequerimientosCommands::Enviar { id } => {
            let detail = check(ctx, service.get(id).await)?;
            check(ctx, service.send_to_review(&detail.requerimiento).await)?;
            done(
                ctx,
                format!("Requerimiento {} enviado a revisión", detail.requerimiento.codigo),
            );
            Ok(())
        }
        RequerimientosCommands::Revisar(args) => {
            let detail = check(ctx, service.get(args.id).await)?;
            let input = RequisitionInput {
                observaciones: normalize_optional_string(args.observaciones),
                items: (!args.items.is_empty()).then(|| requisition_items(&args.items)),
            };
            check(ctx, service.review(&detail.requerimiento, args.accion, input).await)?;
            let verb = match args.accion {
                AccionRevision::Aprobar => "aprobado",
                AccionRevision::Rechazar => "rechazado",
                AccionRevision::Guardar => "guardado",
            };
            done(ctx, format!("Requerimiento {} {}", detail.requerimiento.codigo, verb));
            Ok(())
        }
    }
}

fn done(ctx: &AppContext, message: String) {
    ctx.notifier.notify(Notice::success(message));
}

fn print_requisition(detail: &RequerimientoCompleto, mode: ViewMode) {
    let req = &detail.requerimiento;
    let mode = match mode {
        ViewMode::Draft => "borrador editable",
        ViewMode::Review => "en revisión",
        ViewMode::ReadOnly => "solo lectura",
    };
    println!("{} [{}] ({})", req.codigo, req.estado, mode);
    println!("Creado: {} por #{}", short_date(&req.creado_en), req.creado_por);
    if let Some(obs) = &req.observaciones {
        println!("Observaciones: {}", obs);
    }
    if let Some(obs) = &req.observaciones_aprobador {
        println!("Observaciones del aprobador: {}", obs);
    }
    for (i, item) in detail.items.iter().enumerate() {
        let producto = item
            .producto_nombre
            .clone()
            .unwrap_or_else(|| format!("producto #{}", item.producto_id));
        let unidad = item
            .unidad_abreviatura
            .clone()
            .or_else(|| item.unidad_nombre.clone())
            .unwrap_or_else(|| format!("#{}", item.unidad_medida_id));
        let precio = item
            .precio_unitario_estimado
            .map(|p| format!(" a {:.2}", p))
            .unwrap_or_default();
        println!("  {}. {} {} {}{}", i + 1, item.cantidad, unidad, producto, precio);
    }
}

#[derive(Subcommand)]
pub enum EntradasCommands {
    List(ListArgs),
    Show { id: i64 },
    Create(CreateEntradaArgs),
    /// Void an intake; the record stays listed as voided
    Anular { id: i64 },
    /// Products, suppliers and approved requisitions for the intake form
    Lookups,
}

#[derive(Args)]
pub struct CreateEntradaArgs {
    #[arg(long, help = "Approved requisition to receive against")]
    requerimiento: Option<i64>,
    #[arg(long)]
    proveedor: Option<i64>,
    #[arg(long, help = "Invoice or delivery note number")]
    comprobante: Option<String>,
    #[arg(long)]
    observaciones: Option<String>,
    #[arg(
        long = "item",
        value_parser = parse_item,
        help = "producto:unidad:cantidad[:precio]; repeat for several"
    )]
    items: Vec<(i64, i64, f64, Option<f64>)>,
}

fn entrada_columns() -> Vec<Column<EntradaCentral>> {
    type C = Column<EntradaCentral>;
    vec![
        C::new("id", "ID", |e: &EntradaCentral| CellValue::Int(e.id)),
        C::new("codigo", "Código", |e: &EntradaCentral| CellValue::text(e.codigo.as_str())),
        C::new("tipo", "Tipo", |e: &EntradaCentral| {
            CellValue::text(match e.tipo {
                TipoEntrada::Manual => "manual",
                TipoEntrada::Requerimiento => "requerimiento",
            })
        }),
        C::new("comprobante", "Comprobante", |e: &EntradaCentral| {
            CellValue::opt_text(e.comprobante.as_deref())
        }),
        C::new("total", "Total", |e: &EntradaCentral| CellValue::Number(e.total)),
        C::new("anulado", "Anulado", |e: &EntradaCentral| CellValue::Bool(e.anulado)),
        C::new("creado_en", "Fecha", |e: &EntradaCentral| {
            CellValue::text(short_date(&e.creado_en))
        }),
    ]
}

pub async fn handle_entradas(ctx: &AppContext, command: EntradasCommands, json: bool) -> Result<()> {
    let service = ctx.entradas();
    match command {
        EntradasCommands::List(args) => {
            list_resource::<Entradas>(ctx, &args, &[], &entrada_columns(), json).await
        }
        EntradasCommands::Show { id } => {
            let entrada = check(ctx, service.get(id).await)?;
            if json {
                return print_json(&entrada);
            }
            let estado = if entrada.anulado { " ANULADA" } else { "" };
            println!("{}{} total {:.2}", entrada.codigo, estado, entrada.total);
            if let Some(req) = entrada.requerimiento_id {
                println!("Requerimiento: #{}", req);
            }
            if let Some(c) = &entrada.comprobante {
                println!("Comprobante: {}", c);
            }
            for item in entrada.items.iter().flatten() {
                let producto = item
                    .producto_nombre
                    .clone()
                    .unwrap_or_else(|| format!("producto #{}", item.producto_id));
                println!(
                    "  {} {} x {:.2} = {:.2}",
                    item.cantidad,
                    producto,
                    item.precio_unitario,
                    item.precio_total
                );
            }
            Ok(())
        }
        EntradasCommands::Create(args) => {
            let items: Vec<EntradaItemDto> = args
                .items
                .iter()
                .map(|&(p, u, cantidad, precio)| EntradaItemDto::new(p, u, cantidad, precio.unwrap_or(0.0)))
                .collect();

            let mut dto = match args.requerimiento {
                Some(id) => {
                    let detail = check(ctx, ctx.requisitions().get(id).await)?;
                    let mut draft = check(ctx, service.draft_from_requisition(&detail).await)?;
                    if !items.is_empty() {
                        draft.items = items;
                    }
                    draft
                }
                None => CrearEntradaDto::manual(items),
            };
            dto.proveedor_id = args.proveedor;
            dto.comprobante = normalize_optional_string(args.comprobante);
            dto.observaciones = normalize_optional_string(args.observaciones);

            let entrada = check(ctx, service.create(&dto).await)?;
            if json {
                print_json(&entrada)
            } else {
                done(ctx, format!("Entrada {} registrada", entrada.codigo));
                println!("Total: {:.2}", entrada.total);
                Ok(())
            }
        }
        EntradasCommands::Anular { id } => {
            check(ctx, service.anular(id).await)?;
            done(ctx, format!("Entrada #{} anulada", id));
            Ok(())
        }
        EntradasCommands::Lookups => {
            let lookups = check(ctx, ctx.form_lookups().await)?;
            if json {
                return print_json(&serde_json::json!({
                    "productos": lookups.productos,
                    "proveedores": lookups.proveedores,
                    "requerimientos": lookups.requerimientos,
                }));
            }
            println!("Productos: {}", lookups.productos.len());
            for p in &lookups.productos {
                println!("  {:>4}  {}", p.id, p.nombre);
            }
            println!("Proveedores: {}", lookups.proveedores.len());
            for p in &lookups.proveedores {
                println!("  {:>4}  {} ({})", p.id, p.razon_social, p.ruc);
            }
            println!("Requerimientos aprobados: {}", lookups.requerimientos.len());
            for r in &lookups.requerimientos {
                println!("  {:>4}  {}", r.id, r.codigo);
            }
            Ok(())
        }
    }
}
