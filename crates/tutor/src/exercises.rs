//
// exercises.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use thebe::comm::tutorials_comm::ExerciseKind;
use thebe::comm::tutorials_comm::ExerciseKindInfo;

use crate::executor::FallbackExecutor;
use crate::executor::RuntimeExecutor;
use crate::scripts;

/// Submit a `make_exercise()` call for `kind` to the R session.
///
/// A successful return means the code was submitted; the insertion itself
/// happens in the session.
pub fn insert_exercise<E>(executor: &FallbackExecutor<E>, kind: ExerciseKind) -> anyhow::Result<()>
where
    E: RuntimeExecutor,
{
    let code = scripts::insert_exercise(kind.argument())?;
    executor.execute_r(&code)?;
    Ok(())
}

/// The kind/label catalog for the host's exercise picker.
pub fn exercise_kinds() -> Vec<ExerciseKindInfo> {
    ExerciseKind::all()
        .iter()
        .map(|kind| ExerciseKindInfo {
            kind: *kind,
            label: kind.label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FakeExecutor;

    #[test]
    fn test_insert_submits_the_kind_argument() {
        let executor = FakeExecutor::accepting();
        let fallback = FallbackExecutor::new(executor.clone());

        insert_exercise(&fallback, ExerciseKind::YesAnswer).unwrap();

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].code.contains(r#"make_exercise("yes-answer")"#));
        assert!(requests[0].code.contains("tutorial.helpers"));
    }

    #[test]
    fn test_catalog_covers_every_kind() {
        let catalog = exercise_kinds();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].kind, ExerciseKind::Code);
        assert_eq!(catalog[0].label, "Code Exercise");
        assert_eq!(catalog[2].kind, ExerciseKind::YesAnswer);
        assert_eq!(catalog[2].label, "Yes-Answer Exercise");
    }
}
