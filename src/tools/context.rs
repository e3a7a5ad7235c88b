// ABOUTME: Execution context handed to every tool invocation
// ABOUTME: Carries the caller's AuthContext and the shared data store handle
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use std::sync::Arc;

use crate::auth::AuthContext;
use crate::store::{DataStore, QuerySpec};

/// Per-invocation context
#[derive(Clone)]
pub struct ToolContext {
    /// Authenticated caller
    pub auth: AuthContext,
    /// Data store handle
    pub store: Arc<dyn DataStore>,
}

impl ToolContext {
    /// Create a context
    #[must_use]
    pub fn new(auth: AuthContext, store: Arc<dyn DataStore>) -> Self {
        Self { auth, store }
    }

    /// Tenant the caller belongs to
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.auth.tenant_id
    }

    /// Selection of `table` restricted to the caller's tenant
    #[must_use]
    pub fn scoped(&self, table: &str) -> QuerySpec {
        QuerySpec::scoped(table, &self.auth.tenant_id)
    }
}
