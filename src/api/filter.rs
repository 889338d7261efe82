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

//! Top-level filter instance
//!
//! A [`ContentFilter`] owns the compiled expression for one subscriber,
//! the current expression text and parameter list, and a reusable decode
//! buffer for serialized payloads. All public operations serialize on an
//! internal mutex; distinct instances are fully independent.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, warn};

use super::factory::FilterFactory;
use crate::core::{Error, Result};
use crate::expr::FilterExpression;
use crate::introspect::{PayloadDeserializer, TypeSupport};

/// Magic word stamped on every live filter instance ("CFT").
const FILTER_MAGIC: u32 = 0x43_46_54;

/// A payload handed to [`ContentFilter::evaluate`].
pub enum Payload<'a> {
    /// An already-structured message
    Message(&'a dyn Any),
    /// Serialized bytes, decoded through the instance's deserializer
    Serialized(&'a [u8]),
}

/// Mutable state of a filter instance, guarded by the instance mutex.
struct FilterState {
    /// Compiled expression; `None` means accept-all
    expression: Option<FilterExpression>,
    /// Expression text as last successfully set
    expression_text: String,
    /// Parameter list as last successfully set
    parameters: Vec<String>,
    /// Reusable decode buffer for serialized payloads
    scratch: Option<Box<dyn Any + Send + Sync>>,
}

/// A content filter bound to one message type.
///
/// Freshly created instances have no expression attached: they report
/// [`is_enabled`] as false and accept every payload. Attaching an
/// expression with [`set`] switches them to filtering; setting the empty
/// expression detaches again.
///
/// [`is_enabled`]: ContentFilter::is_enabled
/// [`set`]: ContentFilter::set
pub struct ContentFilter {
    magic: u32,
    type_support: Arc<TypeSupport>,
    factory: Arc<FilterFactory>,
    deserializer: Option<Arc<dyn PayloadDeserializer>>,
    state: Mutex<FilterState>,
}

impl ContentFilter {
    /// Create a filter instance backed by the process-wide factory.
    pub fn new(type_support: Arc<TypeSupport>) -> Self {
        Self::with_factory(type_support, FilterFactory::global())
    }

    /// Create a filter instance backed by a specific factory.
    pub fn with_factory(type_support: Arc<TypeSupport>, factory: Arc<FilterFactory>) -> Self {
        Self {
            magic: FILTER_MAGIC,
            type_support,
            factory,
            deserializer: None,
            state: Mutex::new(FilterState {
                expression: None,
                expression_text: String::new(),
                parameters: Vec::new(),
                scratch: None,
            }),
        }
    }

    /// Attach the codec used for [`Payload::Serialized`] evaluation.
    pub fn with_deserializer(mut self, deserializer: Arc<dyn PayloadDeserializer>) -> Self {
        self.deserializer = Some(deserializer);
        self
    }

    /// Whether an expression is currently attached.
    pub fn is_enabled(&self) -> bool {
        if !self.validate() {
            return false;
        }
        self.state.lock().expression.is_some()
    }

    /// Set or update the filter expression.
    ///
    /// - `Some(text)` parses and binds `text`; on failure the previous
    ///   expression and parameters stay in effect.
    /// - `Some("")` detaches the expression, reverting to accept-all.
    /// - `None` keeps the compiled expression and rebinds only the
    ///   parameter values; on any failure all values roll back.
    pub fn set(&self, expression: Option<&str>, parameters: &[String]) -> Result<()> {
        if !self.validate() {
            return Err(Error::BadParameter("invalid filter instance"));
        }
        let mut state = self.state.lock();

        match expression {
            None => {
                let expr = state
                    .expression
                    .as_mut()
                    .ok_or(Error::BadParameter("no expression to update parameters on"))?;
                expr.set_parameters(parameters)?;
                state.parameters = parameters.to_vec();
                Ok(())
            }
            Some("") => {
                if let Some(old) = state.expression.take() {
                    self.factory.release(old);
                }
                state.expression_text.clear();
                state.parameters = parameters.to_vec();
                Ok(())
            }
            Some(text) => {
                let compiled = self.factory.compile(&self.type_support, text, parameters)?;
                if let Some(old) = state.expression.replace(compiled) {
                    self.factory.release(old);
                }
                state.expression_text = text.to_string();
                state.parameters = parameters.to_vec();
                Ok(())
            }
        }
    }

    /// The current expression text and parameter list.
    ///
    /// Returns `None` while no expression is attached.
    pub fn get(&self) -> Option<(String, Vec<String>)> {
        if !self.validate() {
            return None;
        }
        let state = self.state.lock();
        state
            .expression
            .as_ref()
            .map(|_| (state.expression_text.clone(), state.parameters.clone()))
    }

    /// Evaluate a payload against the attached expression.
    ///
    /// Without an expression every payload is accepted. Serialized
    /// payloads are decoded into a scratch buffer that is allocated on
    /// first use and reused afterwards; a decode failure rejects the
    /// payload.
    pub fn evaluate(&self, payload: Payload<'_>) -> bool {
        if !self.validate() {
            return false;
        }
        let mut guard = self.state.lock();
        let FilterState {
            expression,
            scratch,
            ..
        } = &mut *guard;

        let Some(expr) = expression.as_mut() else {
            warn!("content filter is not set, accepting payload");
            return true;
        };

        match payload {
            Payload::Message(message) => expr.evaluate(message),
            Payload::Serialized(bytes) => {
                let Some(deserializer) = self.deserializer.as_ref() else {
                    error!("serialized payload but no deserializer attached");
                    return false;
                };
                if scratch.is_none() {
                    match deserializer.create_buffer(&self.type_support) {
                        Ok(buffer) => *scratch = Some(buffer),
                        Err(err) => {
                            error!("failed to allocate decode buffer: {}", err);
                            return false;
                        }
                    }
                }
                let Some(buffer) = scratch.as_mut() else {
                    return false;
                };
                if let Err(err) = deserializer.deserialize(bytes, buffer.as_mut()) {
                    error!("failed to deserialize payload: {}", err);
                    return false;
                }
                expr.evaluate(&**buffer)
            }
        }
    }

    /// Check the instance magic word.
    fn validate(&self) -> bool {
        if self.magic != FILTER_MAGIC {
            error!("invalid filter instance (bad magic)");
            return false;
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn corrupt_magic_for_test(&mut self) {
        self.magic = 0;
    }
}

impl Drop for ContentFilter {
    fn drop(&mut self) {
        if let Some(expression) = self.state.get_mut().expression.take() {
            self.factory.release(expression);
        }
    }
}

impl std::fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilter")
            .field("type_support", &self.type_support.identifier())
            .field("enabled", &self.state.lock().expression.is_some())
            .finish_non_exhaustive()
    }
}
