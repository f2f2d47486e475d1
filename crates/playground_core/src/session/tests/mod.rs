//! Session tests against recording mock backends


mod events;
mod frames;
mod lifecycle;
mod reentrancy;
