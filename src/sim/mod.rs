pub mod coupled;
pub mod flow;
pub mod heat;
pub mod stabilization;
