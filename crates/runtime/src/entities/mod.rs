//! Long-lived arena entities, each driven by its own task.

pub(crate) mod boxes;
pub(crate) mod guide;
pub(crate) mod monster;

pub(crate) use boxes::BoxHandle;
pub(crate) use guide::Guide;
pub(crate) use monster::Monster;
