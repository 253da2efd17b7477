// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Nível de permissão inteiro. A checagem de acesso é uma ordem total simples:
/// o usuário entra em tudo cujo requisito seja `<=` ao seu nível.
///
/// Só 1, 2, 5, 6 e 7 têm nome, mas o requisito de uma rota pode ficar
/// entre níveis (ex.: `/users` exige 3).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
#[schema(value_type = i32, example = 5)]
pub struct PermissionLevel(pub i32);

impl PermissionLevel {
    pub const VIEWER: Self = Self(1);
    pub const WORKER: Self = Self(2);
    pub const MANAGER: Self = Self(5);
    pub const ADMIN: Self = Self(6);
    pub const ROOT: Self = Self(7);

    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }

    /// Rótulo e descrição de um nível com nome.
    pub fn info(self) -> Option<PermissionInfo> {
        let (label, description) = match self.0 {
            7 => (
                "Root",
                "Full system access across all companies and data. Reserved for core developers or system administrators.",
            ),
            6 => (
                "Admin",
                "Full access to all companies and data. Can manage users, data, settings, and exports.",
            ),
            5 => (
                "Manager",
                "Can view and manage company data (inventory, orders, reports).",
            ),
            2 => (
                "Worker",
                "Can edit data (e.g., add/update orders or stock). Only within the assigned company.",
            ),
            1 => (
                "Viewer",
                "Read-only access to all relevant dashboards and data, within the assigned company.",
            ),
            _ => return None,
        };
        Some(PermissionInfo { level: self, label, description })
    }

    pub fn label(self) -> &'static str {
        self.info().map(|i| i.label).unwrap_or("Custom")
    }
}

impl Default for PermissionLevel {
    fn default() -> Self {
        Self::VIEWER
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionInfo {
    pub level: PermissionLevel,
    #[schema(value_type = String, example = "Manager")]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
}

// ---
// TABELA DE ROTAS
// ---

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[schema(value_type = String, example = "/insights")]
    pub path: &'static str,
    pub required: PermissionLevel,
    #[schema(value_type = String, example = "Insights")]
    pub title: &'static str,
    #[schema(value_type = String)]
    pub description: &'static str,
}

/// Permissão mínima por prefixo de página. Páginas fora da lista só exigem login válido.
pub const ROUTE_PERMISSIONS: &[RouteRule] = &[
    RouteRule {
        path: "/companies",
        required: PermissionLevel(1),
        title: "Companies",
        description: "Companies and their imported catalogs",
    },
    RouteRule {
        path: "/insights",
        required: PermissionLevel(1),
        title: "Insights",
        description: "Inventory totals, pricing and profit statistics",
    },
    RouteRule {
        path: "/inventory",
        required: PermissionLevel(2),
        title: "Inventory",
        description: "Products in stock and items to reorder",
    },
    RouteRule {
        path: "/logistics",
        required: PermissionLevel(2),
        title: "Logistics",
        description: "Deliveries and shipments",
    },
    RouteRule {
        path: "/documents",
        required: PermissionLevel(5),
        title: "Documents",
        description: "Invoices, delivery notes and exports",
    },
    RouteRule {
        path: "/users",
        required: PermissionLevel(3),
        title: "Users",
        description: "Accounts and permission levels",
    },
    RouteRule {
        path: "/profile",
        required: PermissionLevel(1),
        title: "Profile",
        description: "Your account information",
    },
    RouteRule {
        path: "/settings",
        required: PermissionLevel(1),
        title: "Settings",
        description: "Theme and accent color",
    },
];

/// `/x` casa com `/x` e `/x/...`, nunca com `/xy`.
pub fn rule_for_path(path: &str) -> Option<&'static RouteRule> {
    ROUTE_PERMISSIONS.iter().find(|rule| {
        path == rule.path
            || path
                .strip_prefix(rule.path)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_is_a_total_order_over_levels() {
        for p in 0..=8 {
            for r in 0..=8 {
                assert_eq!(PermissionLevel(p).allows(PermissionLevel(r)), p >= r, "p={p} r={r}");
            }
        }
    }

    #[test]
    fn named_tiers_have_labels() {
        assert_eq!(PermissionLevel::ROOT.label(), "Root");
        assert_eq!(PermissionLevel::WORKER.label(), "Worker");
        assert!(PermissionLevel(3).info().is_none());
        assert_eq!(PermissionLevel(3).label(), "Custom");
    }

    #[test]
    fn rules_match_by_prefix_segment() {
        assert_eq!(rule_for_path("/users").map(|r| r.required), Some(PermissionLevel(3)));
        assert_eq!(rule_for_path("/users/42").map(|r| r.required), Some(PermissionLevel(3)));
        assert!(rule_for_path("/usersettings").is_none());
        assert!(rule_for_path("/").is_none());
    }
}
