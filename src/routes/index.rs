use axum::Json;
use serde_json::{json, Value};

/// API index served at `/`: a welcome envelope summarizing the exposed
/// endpoints and the response format contract.
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Bienvenido a WalkyAPI",
        "version": "1.0.0",
        "documentation": {
            "auth": {
                "register": { "method": "POST", "endpoint": "/api/auth/register", "description": "Registrar nuevo usuario" },
                "login": { "method": "POST", "endpoint": "/api/auth/login", "description": "Iniciar sesión" },
                "verify": { "method": "GET", "endpoint": "/api/auth/verify", "description": "Verificar token válido" },
                "checkSession": { "method": "POST", "endpoint": "/api/auth/check-session", "description": "Verificar sesión activa" },
                "refreshToken": { "method": "POST", "endpoint": "/api/auth/refresh-token", "description": "Renovar token" },
                "logout": { "method": "POST", "endpoint": "/api/auth/logout", "description": "Cerrar sesión" }
            },
            "users": {
                "getAll": { "method": "GET", "endpoint": "/api/users" },
                "search": { "method": "GET", "endpoint": "/api/users/search", "queryParams": { "query": "string", "role": "string", "status": "string", "limit": "number (default: 50)" } },
                "getStats": { "method": "GET", "endpoint": "/api/users/stats" },
                "getById": { "method": "GET", "endpoint": "/api/users/:id" },
                "update": { "method": "PUT", "endpoint": "/api/users/:id" },
                "delete": { "method": "DELETE", "endpoint": "/api/users/:id", "description": "Eliminar usuario (soft delete)" },
                "changeStatus": { "method": "PATCH", "endpoint": "/api/users/:id/status", "body": { "status": "active | inactive | suspended" } }
            },
            "walkers": {
                "getAll": { "method": "GET", "endpoint": "/api/walkers" },
                "getById": { "method": "GET", "endpoint": "/api/walkers/:id" }
            },
            "walks": {
                "create": { "method": "POST", "endpoint": "/api/walks" },
                "getAll": { "method": "GET", "endpoint": "/api/walks" },
                "getById": { "method": "GET", "endpoint": "/api/walks/:id" },
                "changeStatus": { "method": "PATCH", "endpoint": "/api/walks/:id/status" },
                "getRoute": { "method": "GET", "endpoint": "/api/walks/:id/map" },
                "saveLocation": { "method": "POST", "endpoint": "/api/walks/:id/map/location", "body": { "lat": "number (-90..90)", "lng": "number (-180..180)" } },
                "mapAvailability": { "method": "GET", "endpoint": "/api/walks/:id/map/availability" }
            },
            "notifications": {
                "getAll": { "method": "GET", "endpoint": "/api/notifications" },
                "unreadCount": { "method": "GET", "endpoint": "/api/notifications/unread-count" },
                "markRead": { "method": "PATCH", "endpoint": "/api/notifications/:id/read" },
                "markAllRead": { "method": "POST", "endpoint": "/api/notifications/read-all" }
            },
            "tickets": {
                "create": { "method": "POST", "endpoint": "/api/tickets" },
                "getAll": { "method": "GET", "endpoint": "/api/tickets" },
                "getById": { "method": "GET", "endpoint": "/api/tickets/:id" },
                "changeStatus": { "method": "PATCH", "endpoint": "/api/tickets/:id/status" }
            },
            "banners": {
                "getActive": { "method": "GET", "endpoint": "/api/banners" },
                "create": { "method": "POST", "endpoint": "/api/banners" },
                "delete": { "method": "DELETE", "endpoint": "/api/banners/:id" }
            },
            "reviews": {
                "create": { "method": "POST", "endpoint": "/api/reviews" },
                "byWalker": { "method": "GET", "endpoint": "/api/reviews/walker/:id" }
            },
            "subscription": {
                "get": { "method": "GET", "endpoint": "/api/subscription" },
                "update": { "method": "PUT", "endpoint": "/api/subscription" }
            }
        },
        "responseFormat": {
            "success": { "status": "success", "message": "Mensaje descriptivo", "data": {} },
            "error": { "status": "error | fail", "message": "Mensaje de error" }
        }
    }))
}
