//! # RL Sandbox
//!
//! A front end for a reinforcement-learning sandbox. A separate solver process
//! hosts five small environments (grid world, frozen lake, cliff walking,
//! mountain car and cart pole) and runs the classic tabular algorithms on
//! them. This crate drives that solver and turns its answers into pictures.
//!
//! ## The Crates
//!
//! -   **`sandbox`:** the crate you are viewing. [`session::Session`] ties the
//!     other two together; the `sandbox` binary exposes it on the command
//!     line and writes every canvas out as PNG.
//! -   **[`view`]:** environment, value, policy and learning-curve renderers,
//!     the view-state they read and the trajectory player.
//! -   **[`client`]:** the JSON wire contract, the [`client::SandboxApi`]
//!     seam and its HTTP implementation.
//!
//! ## Flow
//!
//! Initialize an environment, train an algorithm against it, then either step
//! through it by hand or let the trained policy run an episode and watch the
//! replay. The solver does all the learning; nothing here simulates the
//! environments.

pub mod config;
pub mod session;

pub use client;
pub use view;
