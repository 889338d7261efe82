// Copyright 2025 Content Filter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Filter factory
//!
//! Compiles filter expressions and recycles their storage through an
//! expression pool. A process-wide factory is available through
//! [`FilterFactory::global`]; instances can also be given their own
//! factory to keep pools separate.

use std::sync::{Arc, LazyLock};

use tracing::error;

use super::filter::ContentFilter;
use super::pool::ObjectPool;
use crate::core::Result;
use crate::expr::{bind_expression, FilterExpression};
use crate::introspect::TypeSupport;
use crate::parser::parse_expression;

/// Process-wide factory shared by default-constructed filters.
static GLOBAL_FACTORY: LazyLock<Arc<FilterFactory>> = LazyLock::new(FilterFactory::new);

/// Compiles and recycles filter expressions.
pub struct FilterFactory {
    expression_pool: ObjectPool<FilterExpression>,
}

impl FilterFactory {
    /// Create a factory with its own expression pool.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            expression_pool: ObjectPool::new(),
        })
    }

    /// The process-wide factory.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_FACTORY)
    }

    /// Create a filter instance backed by this factory.
    pub fn create_filter(self: &Arc<Self>, type_support: Arc<TypeSupport>) -> ContentFilter {
        ContentFilter::with_factory(type_support, Arc::clone(self))
    }

    /// Parse and bind an expression against a message type.
    ///
    /// The returned expression comes from the pool; hand it back through
    /// [`FilterFactory::release`] when replaced or dropped.
    pub(crate) fn compile(
        &self,
        type_support: &Arc<TypeSupport>,
        expression: &str,
        parameters: &[String],
    ) -> Result<FilterExpression> {
        let tree = match parse_expression(expression) {
            Ok(tree) => tree,
            Err(parse_error) => {
                error!("PARSE ERROR: {}", parse_error.format_error());
                return Err(parse_error.into());
            }
        };

        let mut expr = self.expression_pool.get(FilterExpression::new);
        match bind_expression(tree, type_support, parameters, &mut expr) {
            Ok(()) => Ok(expr),
            Err(bind_error) => {
                error!("failed to bind filter expression: {}", bind_error);
                expr.clear();
                self.expression_pool.put(expr);
                Err(bind_error)
            }
        }
    }

    /// Return an expression to the pool.
    pub(crate) fn release(&self, mut expression: FilterExpression) {
        expression.clear();
        self.expression_pool.put(expression);
    }

    /// Number of expressions currently pooled.
    pub fn pooled_expressions(&self) -> usize {
        self.expression_pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Error, TypeTag};
    use crate::introspect::DynamicMembers;

    fn type_support() -> Arc<TypeSupport> {
        TypeSupport::dynamic(
            DynamicMembers::builder()
                .member("x", TypeTag::Int32)
                .build(),
        )
    }

    #[test]
    fn test_compile_success() {
        let factory = FilterFactory::new();
        let expr = factory
            .compile(&type_support(), "x = 4", &[])
            .expect("compile should succeed");
        assert_eq!(expr.parameter_count(), 0);
        factory.release(expr);
        assert_eq!(factory.pooled_expressions(), 1);
    }

    #[test]
    fn test_compile_failure_returns_to_pool() {
        let factory = FilterFactory::new();
        let err = factory
            .compile(&type_support(), "missing = 4", &[])
            .unwrap_err();
        assert!(matches!(err, Error::FieldNotFound(_)));
        // The expression taken for binding went back to the pool.
        assert_eq!(factory.pooled_expressions(), 1);
    }

    #[test]
    fn test_parse_failure() {
        let factory = FilterFactory::new();
        let err = factory.compile(&type_support(), "x = ", &[]).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_pool_reuse() {
        let factory = FilterFactory::new();
        let expr = factory.compile(&type_support(), "x = 1", &[]).unwrap();
        factory.release(expr);

        let expr = factory.compile(&type_support(), "x = 2", &[]).unwrap();
        assert_eq!(factory.pooled_expressions(), 0);
        factory.release(expr);
    }

    #[test]
    fn test_global_factory_is_shared() {
        let a = FilterFactory::global();
        let b = FilterFactory::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
