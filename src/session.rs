// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Signed-in state: bearer token plus cached profile, persisted in the settings table.
//!
//! Commands receive a [`SessionContext`] explicitly. Anything that needs to react to a
//! login, logout or profile edit subscribes to it instead of re-reading the store.

use crate::models::UserProfile;
use crate::utils::{clear_setting, get_setting, set_setting};
use anyhow::{Context, Result};
use reqwest::Url;
use rusqlite::Connection;
use std::sync::mpsc::{Receiver, Sender, channel};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: UserProfile,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn base_currency(&self) -> &str {
        self.user.base_currency()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(UserProfile),
    ProfileChanged(UserProfile),
    SignedOut,
}

pub struct SessionContext<'c> {
    conn: &'c Connection,
    current: Session,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl<'c> SessionContext<'c> {
    pub fn load(conn: &'c Connection) -> Result<Self> {
        let current = read_session(conn)?;
        Ok(Self {
            conn,
            current,
            subscribers: Vec::new(),
        })
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    pub fn session(&self) -> &Session {
        &self.current
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn sign_in(&mut self, token: &str, user: UserProfile) -> Result<()> {
        set_setting(self.conn, TOKEN_KEY, token)?;
        write_user(self.conn, &user)?;
        self.current = Session {
            token: Some(token.to_string()),
            user: user.clone(),
        };
        tracing::info!(email = %user.email, "signed in");
        self.publish(SessionEvent::SignedIn(user));
        Ok(())
    }

    pub fn update_profile(&mut self, user: UserProfile) -> Result<()> {
        write_user(self.conn, &user)?;
        self.current.user = user.clone();
        tracing::info!("profile updated");
        self.publish(SessionEvent::ProfileChanged(user));
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<()> {
        clear_setting(self.conn, TOKEN_KEY)?;
        clear_setting(self.conn, USER_KEY)?;
        self.current = Session::default();
        tracing::info!("signed out");
        self.publish(SessionEvent::SignedOut);
        Ok(())
    }

    /// Picks up changes another process made to the store. Returns whether anything changed.
    pub fn refresh(&mut self) -> Result<bool> {
        let stored = read_session(self.conn)?;
        if stored == self.current {
            return Ok(false);
        }
        let event = match (self.current.is_logged_in(), stored.is_logged_in()) {
            (_, false) => SessionEvent::SignedOut,
            (false, true) => SessionEvent::SignedIn(stored.user.clone()),
            (true, true) if stored.token != self.current.token => {
                SessionEvent::SignedIn(stored.user.clone())
            }
            (true, true) => SessionEvent::ProfileChanged(stored.user.clone()),
        };
        self.current = stored;
        self.publish(event);
        Ok(true)
    }

    fn publish(&mut self, event: SessionEvent) {
        // Dropped receivers are pruned here
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn read_session(conn: &Connection) -> Result<Session> {
    let token = get_setting(conn, TOKEN_KEY)?.filter(|t| !t.is_empty());
    let user = match get_setting(conn, USER_KEY)? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored profile is unreadable; starting blank");
            UserProfile::default()
        }),
        None => UserProfile::default(),
    };
    Ok(Session { token, user })
}

fn write_user(conn: &Connection, user: &UserProfile) -> Result<()> {
    let raw = serde_json::to_string(user).context("Serialize profile")?;
    set_setting(conn, USER_KEY, &raw)
}

/// Result of the Google sign-in redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthLogin {
    pub token: String,
    pub user: UserProfile,
    pub needs_username: bool,
}

/// Reads `token`, `email`, `name` and `userId` from a callback URL or bare query string.
///
/// Fields the callback leaves blank keep their previous values, so a returning user keeps
/// the username and base currency they already chose. `None` when there is no token.
pub fn oauth_login_from_callback(callback: &str, existing: &UserProfile) -> Option<OAuthLogin> {
    let callback = callback.trim();
    let url = Url::parse(callback)
        .or_else(|_| {
            let query = callback.trim_start_matches('?');
            Url::parse(&format!("http://localhost/?{}", query))
        })
        .ok()?;
    let param = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let token = param("token")?;
    let user = UserProfile {
        id: param("userId").unwrap_or_else(|| existing.id.clone()),
        email: param("email").unwrap_or_else(|| existing.email.clone()),
        username: param("name").unwrap_or_else(|| existing.username.clone()),
        name: existing.name.clone(),
        picture: existing.picture.clone(),
        base_currency: Some(existing.base_currency().to_string()),
    };
    let needs_username = user.username.trim().is_empty();
    Some(OAuthLogin {
        token,
        user,
        needs_username,
    })
}
