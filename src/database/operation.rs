/// Logical data operations. Each variant maps to exactly one stored
/// procedure; procedures are the only sanctioned access path to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateProfile,
    GetProfile,
    UpdateProfile,
    DeleteProfile,
    AddActivity,
    UpdateActivity,
}

impl Operation {
    /// Fully qualified stored-procedure name for this operation.
    pub fn procedure(&self) -> &'static str {
        match self {
            Operation::CreateProfile => "trail.create_profile",
            Operation::GetProfile => "trail.read_profile",
            Operation::UpdateProfile => "trail.update_profile",
            Operation::DeleteProfile => "trail.delete_profile",
            Operation::AddActivity => "trail.add_activity",
            Operation::UpdateActivity => "trail.update_activity",
        }
    }
}
