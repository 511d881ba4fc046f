use super::UserId;

/// A marketplace participant. Owns auctions and places bids.
///
/// The (name, email) pair is the user's natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Option<UserId>,
    name: String,
    email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    pub(crate) fn restore(id: UserId, name: String, email: String) -> Self {
        Self {
            id: Some(id),
            name,
            email,
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }
}
