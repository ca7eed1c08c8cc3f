pub mod anticoagulant;
pub mod anticonvulsant;
