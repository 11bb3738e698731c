// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

/// Boxed error to be used where concrete error types do not matter, e.g. tests.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
