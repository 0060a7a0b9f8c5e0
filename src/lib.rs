// Paperlib - Academic paper library client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Paperlib core
//!
//! Client library for the Paperlib paper/library service:
//! - [`api`]: route table, authenticated [`ApiClient`], wire models, Firebase identity
//! - [`notify`]: user-facing notifications and their sinks
//! - [`config`]: client and Firebase configuration
//! - [`error`]: [`PaperlibError`] and user-facing message extraction

pub mod api;
pub mod config;
pub mod error;
pub mod notify;

pub use api::{ApiClient, ApiContext, Outcome, RequestConfig};
pub use config::{ClientConfig, FirebaseConfig};
pub use error::{PaperlibError, Result};
pub use notify::{Notification, Notifier, Severity};
