mod quiz_vm;

pub use quiz_vm::{ChoiceLine, ChoiceMark, QuizScreen, QuizVm};
