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

//! Public filter surface
//!
//! - [`ContentFilter`] - per-subscriber filter instance
//! - [`FilterFactory`] - expression compiler with pooled storage
//! - [`Payload`] - structured or serialized payload handed to evaluate
//! - [`ObjectPool`] - the underlying recycling pool

pub mod factory;
pub mod filter;
pub mod pool;

pub use factory::FilterFactory;
pub use filter::{ContentFilter, Payload};
pub use pool::ObjectPool;
