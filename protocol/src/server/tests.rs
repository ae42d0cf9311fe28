#[cfg(test)]
mod tests {
    use crate::{
        GameType, MessageKind, Player, RequestKind, ServerLine, ServerMessage,
        parse_server_frame, parse_server_message,
    };
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_challstr() {
        let line = "|challstr|4|1234abc";
        let message = parse_server_message(line).unwrap();

        assert_eq!(message, ServerMessage::Challstr("4|1234abc".into()))
    }

    #[test]
    fn test_parse_challstr_invalid() {
        let line = "|challstr|";
        let result = parse_server_message(line);

        assert!(result.is_err());
    }

    #[test]
    fn test_server_line_never_fails() {
        let line = ServerLine::parse("|challstr|");
        assert_eq!(line.kind(), MessageKind::Raw);
        assert_eq!(line.text, "|challstr|");

        let line = ServerLine::parse("|switch|garbage");
        assert_eq!(line.kind(), MessageKind::Raw);
    }

    #[test]
    fn test_parse_unknown() {
        let line = "|someunknown|data";
        let message = parse_server_message(line).unwrap();

        assert_eq!(message, ServerMessage::Raw("|someunknown|data".to_string()));
    }

    #[test]
    fn test_parse_battle_frame() {
        let frame = ">battle-gen9doublesou-77\n|init|battle\n|gametype|doubles\n\n|turn|1";
        let frame = parse_server_frame(frame);

        assert_eq!(frame.battle_id(), Some("battle-gen9doublesou-77"));
        assert_eq!(frame.lines.len(), 3);
        assert_eq!(frame.lines[0].message, ServerMessage::Init("battle".into()));
        assert_eq!(
            frame.lines[1].message,
            ServerMessage::GameType(GameType::Doubles)
        );
        assert_eq!(frame.lines[2].message, ServerMessage::Turn(1));
    }

    #[test]
    fn test_global_frame_has_no_battle_id() {
        let frame = parse_server_frame("|updateuser| sagebot|1|1|{}");
        assert_eq!(frame.battle_id(), None);
        assert_matches!(
            &frame.lines[0].message,
            ServerMessage::UpdateUser { username, named: true, .. } if username == "sagebot"
        );
    }

    #[test]
    fn test_parse_switch() {
        let message =
            parse_server_message("|switch|p2a: Sparky|Pikachu, L50, F, shiny|35/100 par").unwrap();

        assert_matches!(message, ServerMessage::Switch { pokemon, details, hp_status } => {
            assert_eq!(pokemon.player, Player::P2);
            assert_eq!(pokemon.slot(), Some(1));
            assert_eq!(pokemon.name, "Sparky");
            assert_eq!(details.species, "Pikachu");
            assert_eq!(details.level, Some(50));
            assert_eq!(details.gender_tag(), "F");
            assert!(details.shiny);
            let hp = hp_status.unwrap();
            assert_eq!((hp.current, hp.max), (35, Some(100)));
            assert_eq!(hp.status.as_deref(), Some("par"));
        });
    }

    #[test]
    fn test_parse_faint_hp() {
        let message = parse_server_message("|-damage|p1b: Garchomp|0 fnt").unwrap();
        assert_matches!(message, ServerMessage::Damage { pokemon, hp_status: Some(hp) } => {
            assert_eq!(pokemon.slot(), Some(2));
            assert!(hp.is_fainted());
            assert_eq!(hp.max, None);
        });
    }

    #[test]
    fn test_parse_updatesearch() {
        let message = parse_server_message(
            r#"|updatesearch|{"searching":["gen9randombattle"],"games":{"battle-gen9ou-1":"[Gen 9] OU"}}"#,
        )
        .unwrap();

        assert_matches!(message, ServerMessage::UpdateSearch(state) => {
            assert_eq!(state.searching, vec!["gen9randombattle".to_string()]);
            assert_eq!(state.game_count(), 1);
        });

        let message =
            parse_server_message(r#"|updatesearch|{"searching":[],"games":null}"#).unwrap();
        assert_matches!(message, ServerMessage::UpdateSearch(state) => {
            assert_eq!(state.game_count(), 0);
        });
    }

    #[test]
    fn test_parse_formats() {
        let message = parse_server_message(
            "|formats|,1|S/V Singles|[Gen 9] Random Battle,f|[Gen 9] OU,e||,1|S/V Doubles|[Gen 9] Doubles OU,e",
        )
        .unwrap();

        assert_eq!(
            message,
            ServerMessage::Formats(vec![
                "[Gen 9] Random Battle".into(),
                "[Gen 9] OU".into(),
                "[Gen 9] Doubles OU".into(),
            ])
        );
    }

    #[test]
    fn test_parse_request() {
        let line = r#"|request|{"active":[{"moves":[{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24,"target":"normal","disabled":false},{"move":"Struggle","id":"struggle","target":"randomNormal","disabled":"Taunt"}],"canTerastallize":"Electric"}],"side":{"name":"sagebot","id":"p1","pokemon":[{"ident":"p1: Sparky","details":"Pikachu, L50, M","condition":"110/110","active":true,"stats":{"atk":70,"def":50,"spa":70,"spd":60,"spe":110},"moves":["thunderbolt"],"baseAbility":"static","item":"lightball","ability":"static","teraType":"Electric","terastallized":""}]},"rqid":3}"#;
        let message = parse_server_message(line).unwrap();

        assert_matches!(message, ServerMessage::Request(request) => {
            assert_eq!(request.kind(), RequestKind::Active);
            let active = &request.active.as_ref().unwrap()[0];
            assert!(active.moves[0].is_usable());
            assert!(active.moves[1].disabled);
            assert_eq!(active.moves[1].pp, None);
            assert_eq!(active.can_terastallize.as_deref(), Some("Electric"));

            let mon = &request.side.pokemon[0];
            assert_eq!(mon.nickname(), "Sparky");
            assert_eq!(mon.hp(), (110, Some(110)));
            assert_eq!(mon.tera_type.as_deref(), Some("Electric"));
            assert!(!mon.is_terastallized());
        });
    }

    #[test]
    fn test_empty_request_is_raw() {
        let line = ServerLine::parse("|request|");
        assert_eq!(line.kind(), MessageKind::Raw);
    }

    #[test]
    fn test_parse_error_keeps_full_text() {
        let message =
            parse_server_message("|error|[Invalid choice] Can't move: Pikachu|s move").unwrap();
        assert_eq!(
            message,
            ServerMessage::Error("[Invalid choice] Can't move: Pikachu|s move".into())
        );
    }

    #[test]
    fn test_parse_empty() {
        let line = "";
        let message = parse_server_message(line).unwrap();

        assert_eq!(message, ServerMessage::Raw("".to_string()));
    }

    #[test]
    fn test_parse_setup_lines() {
        assert_matches!(
            parse_server_message("|poke|p2|Urshifu-*, L80, M|item").unwrap(),
            ServerMessage::Poke { player: Player::P2, details, has_item: true }
                if details.species == "Urshifu-*" && details.level == Some(80)
        );
        assert_eq!(
            parse_server_message("|gametype|doubles").unwrap(),
            ServerMessage::GameType(GameType::Doubles)
        );
        assert_eq!(parse_server_message("|rated|").unwrap(), ServerMessage::Rated(None));
        assert_eq!(
            ServerLine::parse("|teamsize|p1|six").kind(),
            MessageKind::Raw
        );
    }

    #[test]
    fn test_parse_minor_effects() {
        assert_matches!(
            parse_server_message("|-setboost|p1a: Snorlax|atk|6|[from] move: Belly Drum").unwrap(),
            ServerMessage::SetBoost { amount: 6, .. }
        );
        assert_eq!(
            parse_server_message("|-weather|RainDance|[upkeep]").unwrap(),
            ServerMessage::Weather {
                weather: "RainDance".into(),
                upkeep: true
            }
        );
        assert_matches!(
            parse_server_message("|-enditem|p2a: Boo|Sitrus Berry|[eat]").unwrap(),
            ServerMessage::EndItem { item, from: None, .. } if item == "Sitrus Berry"
        );
        assert_matches!(
            parse_server_message("|-item|p2a: Boo|Choice Scarf|[from] move: Trick").unwrap(),
            ServerMessage::Item { from: Some(from), .. } if from == "move: Trick"
        );
        assert_matches!(
            parse_server_message("|-mega|p2a: Zard|Charizard|Charizardite X").unwrap(),
            ServerMessage::Mega { megastone, .. } if megastone == "Charizardite X"
        );
        assert_matches!(
            parse_server_message("|-mega|p2a: Zard|Charizardite Y").unwrap(),
            ServerMessage::Mega { megastone, .. } if megastone == "Charizardite Y"
        );
        assert_eq!(
            ServerLine::parse("|-boost|p1a: Snorlax|luck|1").kind(),
            MessageKind::Raw
        );
    }

    #[test]
    fn test_parse_move_tags() {
        assert_matches!(
            parse_server_message("|move|p1a: Sparky|Thunderbolt|p2a: Boo|[miss]").unwrap(),
            ServerMessage::Move { move_name, target: Some(target), miss: true, .. }
                if move_name == "Thunderbolt" && target.name == "Boo"
        );
        assert_matches!(
            parse_server_message("|cant|p1a: Sparky|par").unwrap(),
            ServerMessage::Cant { reason, move_name: None, .. } if reason == "par"
        );
    }
}
