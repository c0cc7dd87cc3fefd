mod constant_sequence;
mod luby_sequence;
mod sequence_generator;

pub use constant_sequence::ConstantSequence;
pub use luby_sequence::LubySequence;
pub use sequence_generator::SequenceGenerator;
