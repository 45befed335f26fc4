//! # Marzipan-Core
//!
//! Marzipan-Core emulates the Redcode assembly programs used by the CoreWar
//! programming game.  It is part of Marzipan, a collection of related tools
//! for CoreWar.
//!
//! ## Usage
//!
//! Marzipan-Core provides [`Mars`], a complete '94-draft battle simulator:
//! circular core memory, a shared cyclic process-queue buffer, and a
//! round-robin warrior ring, composed into full battles rather than single
//! instruction steps.
//!
//! [`Mars`] is a low-level interface for running one battle at a time. It
//! doesn't parse warriors from loadfile syntax, schedule tournaments, or
//! track pspace across rounds; callers resolve warrior source into
//! [`redcode::CompleteInstruction`]s and choose where to load them.
//!
//! ```rust
//! # use redcode::*;
//! # use marzipan_core::Mars;
//! # use marzipan_core::mars::Config;
//! let mut mars = Mars::allocate(Config {
//!     nwarriors: 2,
//!     core_size: 8000,
//!     processes: 64,
//!     cycles: 80_000,
//! })
//! .unwrap();
//!
//! let dwarf = vec![
//!     // Add.AB #4, $3
//!     CompleteInstruction{
//!         instr: Instruction {
//!             opcode: Opcode::Add,
//!             modifier: Modifier::AB,
//!             a_addr_mode: AddrMode::Immediate,
//!             b_addr_mode: AddrMode::Direct
//!         },
//!         a_field: 4,
//!         b_field: 3
//!     },
//!     // Mov.I $2, @2
//!     CompleteInstruction{
//!         instr: Instruction {
//!             opcode: Opcode::Mov,
//!             modifier: Modifier::I,
//!             a_addr_mode: AddrMode::Direct,
//!             b_addr_mode: AddrMode::IndirectB
//!         },
//!         a_field: 2,
//!         b_field: 2
//!     },
//!     // Jmp.B $-2, $0
//!     CompleteInstruction{
//!         instr: Instruction {
//!             opcode: Opcode::Jmp,
//!             modifier: Modifier::B,
//!             a_addr_mode: AddrMode::Direct,
//!             b_addr_mode: AddrMode::Direct
//!         },
//!         a_field: 8000 - 2,
//!         b_field: 3
//!     },
//! ];
//!
//! mars.load_warrior(0, &dwarf).unwrap();
//! mars.load_warrior(100, &dwarf).unwrap();
//!
//! // Run to completion: a sole survivor, mutual annihilation, or a tie once
//! // the cycle budget runs out.
//! let outcome = mars.run_battle(&[0, 100]).unwrap();
//! assert!(outcome.alive_count <= 2);
//! ```
//!
//! ## MARS
//!
//! The term MARS (Memory Array Redcode Simulator) describes a fully featured
//! emulator like pMARS (the defacto standard emulator) or exhaust. [`Mars`]
//! implements the core of one: the battlefield, scheduler, and instruction
//! semantics. It does not parse warriors or configurations from source, and
//! it has no notion of a multi-round tournament; composing battles into a
//! tournament and interpreting their results is left to a caller.
// Make clippy as annoying as possible
#![deny(
    // All typically enabled warnings are converted into errors
    // includes correctness, suspicious, style, complexity, and perf
    clippy::all,
    // Error on cargo lints
    clippy::cargo,
)]
#![warn(
    // Warn on pedantic and in-development nursery lints
    clippy::pedantic,
    clippy::nursery,
    // Lints from "restriction" group - enforce a consistent if arbitrary style
    clippy::alloc_instead_of_core,
    clippy::allow_attributes_without_reason,
    clippy::arithmetic_side_effects,
    clippy::unnecessary_cast,
    clippy::as_underscore,
    clippy::assertions_on_result_states,
    clippy::clone_on_ref_ptr,
    clippy::create_dir,
    clippy::dbg_macro,
    clippy::decimal_literal_representation,
    clippy::default_numeric_fallback,
    clippy::deref_by_slicing,
    clippy::empty_drop,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::expect_used,
    clippy::filetype_is_file,
    clippy::float_arithmetic,
    clippy::fn_to_numeric_cast_any,
    clippy::format_push_string,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::indexing_slicing,
    clippy::large_include_file,
    clippy::let_underscore_must_use,
    clippy::lossy_float_literal,
    clippy::map_err_ignore,
    clippy::mem_forget,
    clippy::missing_docs_in_private_items,
    clippy::missing_enforced_import_renames,
    clippy::mixed_read_write_in_expression,
    clippy::mod_module_files,
    clippy::multiple_inherent_impl,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::partial_pub_fields,
    clippy::pattern_type_mismatch,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::rc_buffer,
    clippy::rc_mutex,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_name_method,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::str_to_string,
    clippy::string_slice,
    clippy::string_to_string,
    clippy::suspicious_xor_used_as_pow,
    clippy::todo,
    clippy::try_err,
    clippy::undocumented_unsafe_blocks,
    clippy::unimplemented,
    clippy::unnecessary_safety_comment,
    clippy::unnecessary_safety_doc,
    clippy::unnecessary_self_imports,
    clippy::unneeded_field_pattern,
    clippy::unreachable,
    clippy::unwrap_in_result,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::verbose_file_reads,
)]
#![allow(
    clippy::needless_pass_by_value,
    reason = "Internal Compiler Error bug workaround: https://github.com/rust-lang/rust-clippy/issues/10344"
)]

// Use no-std collections
extern crate alloc;

/// Circular core memory that warriors execute in and mutate.
mod battlefield;
/// Decoded-instruction dispatch: what each opcode does to the battlefield
/// and to the scheduler.
mod dispatch;
/// Error and result types shared across this crate's public API.
pub mod error;
/// The battle simulator: [`Mars`] and its supporting [`mars::Config`] and
/// [`mars::BattleOutcome`] types.
pub mod mars;
/// A-operand and B-operand resolution, including addressing-mode side
/// effects.
mod operands;
/// The shared cyclic buffer of queued instruction pointers.
mod process_queue;
/// The index-based intrusive ring of live warriors.
mod warrior_ring;

pub use error::{MarsError, MarsResult};
pub use mars::Mars;

/// An offset into the battlefield, valid from 0 to `core_size - 1`
/// inclusive.
pub type CoreAddr = redcode::FieldValue;
