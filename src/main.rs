// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Formation Editor: distribute performers along a formation line

fn main() -> anyhow::Result<()> {
    formation_editor::run()
}
