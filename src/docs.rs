// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Pages ---
        handlers::pages::dashboard,
        handlers::pages::login_page,
        handlers::pages::insights,
        handlers::pages::inventory,
        handlers::pages::companies,
        handlers::pages::users,

        // --- Profile ---
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::change_password,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Products ---
        handlers::products::import_products,
        handlers::products::list_products,

        // --- Reports ---
        handlers::products::summary,
        handlers::products::below_reorder,
        handlers::products::non_profitable,
        handlers::products::discounted,
        handlers::products::out_of_stock,
        handlers::products::low_stock,
        handlers::products::top_priced,
        handlers::products::collections,
        handlers::products::stale_stock,

        // --- Admin ---
        handlers::products::clear_table,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserSummary,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- RBAC ---
            models::rbac::PermissionLevel,
            models::rbac::PermissionInfo,
            models::rbac::RouteRule,

            // --- Pages ---
            models::dashboard::NavCard,
            models::dashboard::DashboardView,
            models::dashboard::LoginPage,
            models::dashboard::ReportSummary,
            models::dashboard::InventoryPage,
            models::dashboard::CompanyCount,

            // --- Profile ---
            models::profile::ProfileView,
            models::profile::UpdateProfilePayload,
            models::profile::ChangePasswordPayload,

            // --- Settings ---
            models::settings::Theme,
            models::settings::AccentColor,
            models::settings::UserSettings,
            models::settings::UpdateSettingsRequest,

            // --- Products ---
            models::product::Product,
            models::product::ImportSummary,
            handlers::products::ImportProductsPayload,
            handlers::products::ClearTableResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sign in and session cookie"),
        (name = "Pages", description = "Gated dashboard pages"),
        (name = "Profile", description = "Account details and password"),
        (name = "Settings", description = "Theme and accent color"),
        (name = "Products", description = "Catalog import and listing"),
        (name = "Reports", description = "Inventory and pricing metrics"),
        (name = "Admin", description = "Maintenance")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_report_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/reports/summary"));
        assert!(doc.paths.paths.contains_key("/api/admin/tables/{table}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
