pub mod amm;
pub mod denom;
pub mod helper;
pub mod math;
pub mod oracle;
pub mod record;
