/// How a user signs in. Credential checks live outside the engine; the tag
/// only records which authenticator owns the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthKind {
    Password,
    OAuth { provider: String },
}

impl AuthKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::OAuth { .. } => "oauth",
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Password => None,
            Self::OAuth { provider } => Some(provider),
        }
    }

    /// Rebuild from the stored tag and optional provider column.
    pub fn from_parts(tag: &str, provider: Option<String>) -> Option<Self> {
        match (tag, provider) {
            ("password", _) => Some(Self::Password),
            ("oauth", Some(provider)) => Some(Self::OAuth { provider }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub auth: AuthKind,
    pub created_at: String,
}

impl User {
    pub fn new(username: impl Into<String>, auth: AuthKind) -> Self {
        Self {
            id: None,
            username: username.into(),
            auth,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
