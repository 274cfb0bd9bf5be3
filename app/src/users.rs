use std::fmt;
use std::str::FromStr;

use log::*;
use serde::{Deserialize, Serialize};

use infra::documents::Entity;
use infra::persistence::Storage;

use crate::error::{Error, Result};
use crate::services::{Commandable, Queryable, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct Accounts<'a, S> {
    store: &'a S,
}

#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Login {
    pub user_id: String,
    pub password: String,
}

/// Answers whether a user id is still free, so the account form can ask
/// again before collecting the rest of the fields.
#[derive(Debug, Clone)]
pub struct IsTaken(pub String);

impl Request for CreateAccount {
    type Resp = User;
}
impl Request for Login {
    type Resp = User;
}
impl Request for IsTaken {
    type Resp = bool;
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn validate(&self) -> std::result::Result<(), String> {
        if self.user_id.is_empty() {
            return Err("empty user_id".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Admin => write!(fmt, "admin"),
            Role::Customer => write!(fmt, "customer"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;
    fn from_str(src: &str) -> Result<Self> {
        match src.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(Error::validation(format!("Unknown role: {:?}", other))),
        }
    }
}

impl<'a, S: Storage> Accounts<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Accounts { store }
    }
}

impl<'a, S: Storage> Queryable<IsTaken> for Accounts<'a, S> {
    fn query(&self, IsTaken(user_id): IsTaken) -> Result<bool> {
        let users = self.store.load::<User>()?;
        Ok(users.iter().any(|u| u.user_id == user_id.trim()))
    }
}

impl<'a, S: Storage> Commandable<CreateAccount> for Accounts<'a, S> {
    fn execute(&self, req: CreateAccount) -> Result<User> {
        let user = User {
            user_id: req.user_id.trim().to_string(),
            name: req.name.trim().to_string(),
            phone: req.phone.trim().to_string(),
            password: req.password.trim().to_string(),
            role: req.role,
        };
        if user.user_id.is_empty() {
            return Err(Error::validation("User ID cannot be empty."));
        }

        let mut users = self.store.load::<User>()?;
        if users.iter().any(|u| u.user_id == user.user_id) {
            return Err(Error::DuplicateId {
                kind: "user",
                id: user.user_id,
            });
        }
        users.push(user.clone());
        self.store.save(&users)?;
        info!("Created account {} as {}", user.user_id, user.role);
        Ok(user)
    }
}

impl<'a, S: Storage> Queryable<Login> for Accounts<'a, S> {
    fn query(&self, req: Login) -> Result<User> {
        let user_id = req.user_id.trim();
        let password = req.password.trim();
        let user = self
            .store
            .load::<User>()?
            .into_iter()
            .find(|u| u.user_id == user_id && u.password == password);
        match user {
            Some(user) => {
                debug!("Login for {}", user.user_id);
                Ok(user)
            }
            None => {
                debug!("Failed login for {:?}", user_id);
                Err(Error::InvalidCredentials)
            }
        }
    }
}
