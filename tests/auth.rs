//! Integration tests for roles and command authorization.

use tennis_doubles_web::{Command, Identity, Role, TournamentError};

#[test]
fn role_defaults_to_player_when_missing() {
    let identity: Identity = serde_json::from_str(r#"{"userId":"u1"}"#).unwrap();
    assert_eq!(identity.current_user_id(), "u1");
    assert_eq!(identity.current_user_role(), Role::Player);

    let identity: Identity = serde_json::from_str(r#"{"userId":"u2","role":"tournamentManager"}"#).unwrap();
    assert_eq!(identity.role, Role::TournamentManager);
    assert!(identity.is_organizer());
}

#[test]
fn only_organizers_pass_the_role_table() {
    let commands = [
        Command::RegisterPlayers,
        Command::AddSubstitute,
        Command::GenerateTeams,
        Command::GenerateSchedule,
        Command::EnterScore,
        Command::CancelMatch,
        Command::SubstitutePlayer,
        Command::ClearAllData,
    ];
    for command in commands {
        assert!(Identity::new("a", Role::Admin).authorize(command).is_ok());
        assert!(Identity::new("m", Role::TournamentManager).authorize(command).is_ok());
        for role in [Role::TeamCaptain, Role::Player] {
            assert_eq!(
                Identity::new("x", role).authorize(command),
                Err(TournamentError::PermissionDenied { role, command })
            );
        }
    }
}

#[test]
fn permission_error_reads_well() {
    let err = Identity::new("x", Role::Player)
        .authorize(Command::ClearAllData)
        .unwrap_err();
    assert_eq!(err.to_string(), "Role player is not allowed to clear all data");
    assert_eq!(err.kind(), "PermissionDenied");
}
