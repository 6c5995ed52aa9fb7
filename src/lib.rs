// Module layout (Clean Architecture style)
// - bootstrap: configuration and wiring
// - infrastructure: Postgres, object store and mail adapters
// - presentation: HTTP handlers and routing
// - application: ports, the media lifecycle service and use cases
// - domain: core models and media policies

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
mod test_utils;
