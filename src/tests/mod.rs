// Copyright 2025 Cameron Swords
// SPDX-License-Identifier: Apache-2.0

mod passes;
mod pipeline;
mod support;
