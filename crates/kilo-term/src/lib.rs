// SPDX-License-Identifier: MIT
//
// kilo-term: Terminal layer for kilo.
//
// Everything that touches the tty lives here: raw mode with guaranteed
// restore, the window-size query, decoding of raw input bytes into keys,
// ANSI sequence writers, and the buffer that sends each frame in one write.
//
// No TUI framework in between. The editor core above this crate composes
// frames as plain bytes and never needs to know how the tty is configured.

pub mod ansi;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
