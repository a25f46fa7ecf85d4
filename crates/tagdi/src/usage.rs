//! # Usage Guide
//!
//! ## Keys and tags
//!
//! Every key may carry tags after the bare name: `"name #tag #tag=value"`.
//! Reserved tags:
//!
//! - `shared` - one instance per session
//! - `private` - hidden from [`Container::get`](crate::Container::get), still
//!   injectable into other services
//! - `priority` - ordering of tagged lookups, highest first (`i16`, default 0)
//! - `value`, `factory`, `alias`, `inject` - the definition kind, set for you by the
//!   matching registration method
//!
//! Any other tag is free-form and can be queried with
//! [`Container::get_tagged_by`](crate::Container::get_tagged_by).
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tagdi::prelude::*;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct Repository {
//!     db: Arc<Database>,
//! }
//!
//! let builder = ContainerBuilder::new();
//! builder.set_parameter("db.url", "postgres://localhost/app").unwrap();
//! builder
//!     .set_factory("db #shared #private", |c| {
//!         Ok(Arc::new(Database { url: c.parameter("db.url")? }))
//!     })
//!     .unwrap();
//! builder
//!     .set_factory("repository", |c| Ok(Arc::new(Repository { db: c.get_as("db")? })))
//!     .unwrap();
//!
//! let container = builder.get_container().unwrap();
//! let repository = container.get_as::<Repository>("repository").unwrap();
//! assert_eq!(repository.db.url, "postgres://localhost/app");
//!
//! // private services are only reachable from other factories
//! assert!(container.get("db").is_err());
//! ```
//!
//! ## Tagged collections
//!
//! ```rust
//! use tagdi::{tags, ContainerBuilder, ContainerExt};
//!
//! let builder = ContainerBuilder::new();
//! builder.set_value("json #encoder=json", "application/json").unwrap();
//! builder
//!     .set_value_with_tags("yaml", "application/yaml", tags! { "encoder" = "yaml", "priority" = 5 })
//!     .unwrap();
//!
//! let container = builder.get_container().unwrap();
//! let all = container.get_tagged_as::<&str>("encoder", &[]).unwrap();
//! assert_eq!(*all[0], "application/yaml");
//! assert_eq!(*all[1], "application/json");
//!
//! let only_json = container.get_tagged_as::<&str>("encoder", &["json"]).unwrap();
//! assert_eq!(only_json.len(), 1);
//! ```
//!
//! ## Batch registration
//!
//! ```rust
//! use tagdi::{Binding, Container, ContainerBuilder, ContainerExt, Target};
//!
//! let builder = ContainerBuilder::new();
//! builder
//!     .set_all([
//!         Binding::new("greeting #shared", Target::value(String::from("hello"))),
//!         Binding::new("hi", Target::alias("greeting")).with_tag("private", ""),
//!     ])
//!     .unwrap();
//!
//! let container = builder.get_container().unwrap();
//! assert_eq!(container.get_as::<String>("greeting").unwrap().as_str(), "hello");
//! assert!(container.get("hi").is_err());
//! ```
//!
//! ## Configuration files
//!
//! ```rust
//! use tagdi::{ContainerBuilder, ContainerConfig, ContainerExt};
//!
//! let config = ContainerConfig::from_toml_str(
//!     r#"
//!     [parameters]
//!     "http.port" = 8080
//!
//!     [aliases]
//!     "logger" = "logger.console"
//!     "#,
//! )
//! .unwrap();
//!
//! let builder = ContainerBuilder::new();
//! builder.set_value("logger.console", "console").unwrap();
//! config.install(&builder).unwrap();
//!
//! let container = builder.get_container().unwrap();
//! assert_eq!(container.parameter::<u16>("http.port").unwrap(), 8080);
//! assert_eq!(*container.get_as::<&str>("logger").unwrap(), "console");
//! ```
