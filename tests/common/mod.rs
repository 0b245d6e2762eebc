#![allow(dead_code)]

use std::sync::Arc;

use backoffice::infrastructure::auth::Claims;
use backoffice::infrastructure::{MemoryTokenStore, StoredSession};
use backoffice::services::RecordingNotifier;
use backoffice::{AppContext, Config};
use jsonwebtoken::{EncodingKey, Header, encode};
use wiremock::MockServer;

pub const OWNER: &str = "Dueño";

pub fn claims(sub: i64, rol: &str, permisos: &[&str]) -> Claims {
    let now = chrono::Utc::now().timestamp();
    Claims {
        sub,
        email: format!("user{}@example.com", sub),
        empresa_id: 1,
        schema: "empresa_demo".to_string(),
        rol: rol.to_string(),
        locales: vec![1],
        permisos: permisos.iter().map(|p| p.to_string()).collect(),
        iat: Some(now),
        exp: Some(now + 3600),
    }
}

/// Tokens are decoded without verification, any key will do.
pub fn token_for(claims: &Claims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(b"test-secret"))
        .expect("token should encode")
}

pub struct TestApp {
    pub ctx: AppContext,
    pub notices: Arc<RecordingNotifier>,
    pub store: Arc<MemoryTokenStore>,
}

/// Context pointed at `server`, logged in as `claims` when given.
pub fn app(server: &MockServer, claims: Option<&Claims>) -> TestApp {
    let store = Arc::new(match claims {
        Some(c) => MemoryTokenStore::with_session(StoredSession {
            access_token: token_for(c),
            user_name: Some("Operador de prueba".to_string()),
        }),
        None => MemoryTokenStore::new(),
    });
    let notices = Arc::new(RecordingNotifier::new());
    let mut config = Config::new(server.uri());
    config.timeout_secs = 5;
    let ctx = AppContext::init(config, store.clone(), notices.clone()).expect("context should build");
    TestApp { ctx, notices, store }
}

pub fn local_json(id: i64, nombre: &str, codigo: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "empresaId": 1,
        "nombre": nombre,
        "codigo": codigo,
        "tieneMesas": true,
        "direccion": null,
        "telefono": null,
        "activo": true
    })
}

pub fn requerimiento_json(id: i64, estado: &str, creado_por: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "codigo": format!("REQ-{:04}", id),
        "tipo": "compra",
        "estado": estado,
        "observaciones": null,
        "observaciones_aprobador": null,
        "creado_por": creado_por,
        "creado_en": "2026-01-05T10:00:00.000Z",
        "actualizado_en": "2026-01-05T10:00:00.000Z",
        "items": [{
            "id": 1,
            "requerimiento_id": id,
            "producto_id": 3,
            "unidad_medida_id": 1,
            "cantidad": 2.0,
            "precio_unitario_estimado": 4.5,
            "precio_total_estimado": 9.0,
            "observaciones": null,
            "producto_nombre": "Harina",
            "producto_codigo": "P-003",
            "unidad_nombre": "Kilogramo",
            "unidad_abreviatura": "kg"
        }]
    })
}
