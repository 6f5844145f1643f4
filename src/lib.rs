// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod error;
pub mod models;
pub mod metrics;
pub mod summary;
pub mod report;
pub mod forms;
pub mod format;
pub mod config;
pub mod api;
pub mod cli;
pub mod utils;
pub mod commands;
