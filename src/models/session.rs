use crate::models::{Role, UserId};

/// Who is at the keyboard. Replaced wholesale on login and logout, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Authenticated {
        user_id: Option<UserId>,
        role: Option<Role>,
    },
}

/// The disjoint view sets a session can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTree {
    Login(AuthMode),
    Admin,
    User,
    /// Authenticated, but the backend handed back a role we do not know.
    Blank,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

impl SessionContext {
    pub fn signed_in(user_id: Option<UserId>, role: Option<Role>) -> Self {
        SessionContext::Authenticated { user_id, role }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionContext::Authenticated { .. })
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionContext::Authenticated { role, .. } => *role,
            SessionContext::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            SessionContext::Authenticated { user_id, .. } => user_id.as_ref(),
            SessionContext::Anonymous => None,
        }
    }

    pub fn view(&self, mode: AuthMode) -> ViewTree {
        match self {
            SessionContext::Anonymous => ViewTree::Login(mode),
            SessionContext::Authenticated {
                role: Some(Role::Admin),
                ..
            } => ViewTree::Admin,
            SessionContext::Authenticated {
                role: Some(Role::User),
                ..
            } => ViewTree::User,
            SessionContext::Authenticated { role: None, .. } => ViewTree::Blank,
        }
    }
}
