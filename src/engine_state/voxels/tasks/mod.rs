//! # Voxel Task System
//!
//! Background work for the voxel world. The only long-lived task is the
//! `WorldUpdater`, which decides which chunks should exist around the camera
//! and proposes the missing ones to the world.

pub mod world_updater;
