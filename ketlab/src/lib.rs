// ketlab - state vectors, operators and measurement for small qubit systems
// Copyright (C) 2026 - The ketlab developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! State vectors, unitary operators and computational-basis measurement for
//! small qubit systems.
//!
//! Qubit `k` is bit `k` of a basis index, and kets are written with the
//! highest qubit first, so `|10⟩` is basis state 2.

pub mod circuit;
pub mod error;
pub mod evolve;
pub mod gate;
pub mod limits;
pub mod measure;
pub mod operator;
pub mod registers;
pub mod state;

pub use error::{QError, Result};
pub use limits::Limits;
pub use operator::Operator;
pub use state::StateVector;
