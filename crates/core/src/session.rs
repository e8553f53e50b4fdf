//! Cached identity, role markers and the synchronous gate decision.
//!
//! The identity is whatever user object the backend returned at sign-in,
//! kept as raw JSON. Different endpoints describe roles differently, so
//! [`Identity::roles`] collects markers from every known shape:
//!
//! - `role: "staff"` / `userRole` / `user_role`
//! - `roles: ["ROLE_ADMIN"]` or `roles: [{ "name": "staff" }]`
//! - `isAdmin: true` / `isStaff: true` (and snake_case forms)
//! - any of the above under a nested `user` object

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payload::Payload;

/// Keys whose values are role markers.
const ROLE_KEYS: &[&str] = &[
    "role",
    "roles",
    "userRole",
    "user_role",
    "isAdmin",
    "is_admin",
    "isStaff",
    "is_staff",
];

const ID: &[&str] = &["id", "_id", "userId", "user_id", "user.id", "user._id"];
const NAME: &[&str] = &[
    "name",
    "fullName",
    "full_name",
    "username",
    "user.name",
    "user.fullName",
];
const EMAIL: &[&str] = &["email", "user.email"];
const PROVIDER: &[&str] = &["authProvider", "auth_provider", "provider", "user.provider"];
const GOOGLE_FLAG: &[&str] = &["isGoogleUser", "is_google_user", "googleUser"];

// =============================================================================
// Roles
// =============================================================================

/// Account role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    /// Parse a role marker such as `"ROLE_ADMIN"`, `"Staff"` or `"customer"`.
    #[must_use]
    pub fn from_marker(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let bare = lowered.strip_prefix("role_").unwrap_or(&lowered);
        match bare {
            "admin" | "administrator" | "superadmin" | "super_admin" => Some(Self::Admin),
            "staff" | "employee" | "manager" | "operator" => Some(Self::Staff),
            "customer" | "user" | "member" | "client" => Some(Self::Customer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_marker(s).ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// The role a gated surface demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredRole {
    /// Any signed-in user.
    Customer,
    /// Staff or admin.
    Staff,
    /// Admin only.
    Admin,
}

impl RequiredRole {
    /// Whether `identity` carries a role this surface accepts.
    #[must_use]
    pub fn admits(self, identity: &Identity) -> bool {
        match self {
            Self::Customer => true,
            Self::Staff => identity.has_role(Role::Staff) || identity.has_role(Role::Admin),
            Self::Admin => identity.has_role(Role::Admin),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The locally cached user object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Value);

impl Identity {
    #[must_use]
    pub const fn new(raw: Value) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_raw(self) -> Value {
        self.0
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        Payload::new(&self.0).text(ID)
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        Payload::new(&self.0).text(NAME)
    }

    #[must_use]
    pub fn email(&self) -> Option<String> {
        Payload::new(&self.0).text(EMAIL)
    }

    /// Every role marker found on the identity, deduplicated, lowest first.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::new();
        collect_roles(&self.0, &mut roles);
        if let Some(user) = self.0.get("user") {
            collect_roles(user, &mut roles);
        }
        roles.sort_unstable();
        roles.dedup();
        roles
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// Most privileged role, if any marker is present.
    #[must_use]
    pub fn highest_role(&self) -> Option<Role> {
        self.roles().into_iter().max()
    }

    /// Whether the session came from a third-party (Google) sign-in.
    #[must_use]
    pub fn is_third_party(&self) -> bool {
        let p = Payload::new(&self.0);
        p.flag(GOOGLE_FLAG).unwrap_or(false)
            || p.text(PROVIDER)
                .is_some_and(|provider| provider.eq_ignore_ascii_case("google"))
    }

    /// Tag the identity as coming from a Google sign-in.
    pub fn mark_third_party(&mut self) {
        if let Value::Object(map) = &mut self.0 {
            map.insert("authProvider".to_string(), Value::String("google".into()));
        }
    }

    /// Overlay a freshly fetched profile onto the cached identity.
    ///
    /// Role markers already cached are kept: a profile endpoint that omits or
    /// reshapes roles must not change what the gate saw at sign-in.
    pub fn merge_profile(&mut self, profile: &Value) {
        let Value::Object(incoming) = profile else {
            return;
        };
        let incoming = match incoming.get("user") {
            Some(Value::Object(user)) => user,
            _ => incoming,
        };

        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        let had_roles = !self.roles().is_empty();
        let Value::Object(cached) = &mut self.0 else {
            return;
        };

        for (key, value) in incoming {
            if had_roles && ROLE_KEYS.contains(&key.as_str()) {
                continue;
            }
            cached.insert(key.clone(), value.clone());
        }
    }
}

fn collect_roles(value: &Value, out: &mut Vec<Role>) {
    let Value::Object(map) = value else {
        return;
    };

    for key in ["role", "userRole", "user_role"] {
        if let Some(role) = map.get(key).and_then(marker_of) {
            out.push(role);
        }
    }

    match map.get("roles") {
        Some(Value::Array(items)) => out.extend(items.iter().filter_map(marker_of)),
        Some(single) => out.extend(marker_of(single)),
        None => {}
    }

    let flag = |keys: [&str; 2]| {
        keys.iter()
            .any(|k| map.get(*k).and_then(Value::as_bool).unwrap_or(false))
    };
    if flag(["isAdmin", "is_admin"]) {
        out.push(Role::Admin);
    }
    if flag(["isStaff", "is_staff"]) {
        out.push(Role::Staff);
    }
}

/// A role marker is a string or an object carrying `name`/`role`.
fn marker_of(value: &Value) -> Option<Role> {
    match value {
        Value::String(s) => Role::from_marker(s),
        Value::Object(_) => Payload::new(value)
            .text(&["name", "role", "authority"])
            .and_then(|s| Role::from_marker(&s)),
        _ => None,
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Outcome of checking a gated surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Authorized,
    /// Send the user to the sign-in page, returning to the origin afterwards.
    Redirect { target: String },
}

/// Decide access from cached state only; never touches the network.
#[must_use]
pub fn decide(
    identity: Option<&Identity>,
    has_token: bool,
    required: RequiredRole,
    origin: &str,
    login_path: &str,
) -> GateDecision {
    match identity {
        Some(identity) if has_token && required.admits(identity) => GateDecision::Authorized,
        _ => GateDecision::Redirect {
            target: login_redirect(login_path, origin),
        },
    }
}

/// `<login_path>?redirect=<url-encoded origin>`
#[must_use]
pub fn login_redirect(login_path: &str, origin: &str) -> String {
    format!("{login_path}?redirect={}", urlencoding::encode(origin))
}

// =============================================================================
// Navigation
// =============================================================================

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const SHOP: &[NavItem] = &[nav("Shop", "/packages"), nav("Cart", "/cart")];
const ACCOUNT: &[NavItem] = &[
    nav("Account", "/account"),
    nav("Subscriptions", "/account/subscriptions"),
];
const STAFF: &[NavItem] = &[
    nav("Staff dashboard", "/staff"),
    nav("Orders", "/staff/orders"),
    nav("Customers", "/staff/customers"),
    nav("Deliveries", "/staff/deliveries"),
];
const ADMIN: &[NavItem] = &[
    nav("Dashboard", "/admin"),
    nav("Customers", "/admin/customers"),
    nav("Orders", "/admin/orders"),
    nav("Packages", "/admin/packages"),
    nav("Reports", "/admin/reports"),
];

/// Menu entries visible to `identity` (`None` for anonymous visitors).
#[must_use]
pub fn navigation_for(identity: Option<&Identity>) -> Vec<NavItem> {
    let mut items = SHOP.to_vec();
    let Some(identity) = identity else {
        items.push(nav("Sign in", "/login"));
        return items;
    };

    items.extend_from_slice(ACCOUNT);
    match identity.highest_role() {
        Some(Role::Admin) => items.extend_from_slice(ADMIN),
        Some(Role::Staff) => items.extend_from_slice(STAFF),
        Some(Role::Customer) | None => {}
    }
    items
}
