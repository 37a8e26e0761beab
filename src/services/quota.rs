// src/services/quota.rs

use crate::models::user::Plan;

/// Maximum number of quizzes a user on `plan` may own.
pub const fn quiz_limit(plan: Plan) -> u64 {
    match plan {
        Plan::Free => 5,
        Plan::Premium => 10,
    }
}

/// Whether a user on `plan` who already owns `existing` quizzes may create another.
pub const fn can_create(plan: Plan, existing: u64) -> bool {
    existing < quiz_limit(plan)
}
