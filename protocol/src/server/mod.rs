mod args;
mod battle;
mod battle_init;
mod battle_major;
mod battle_minor;
mod battle_progress;
mod global;
mod request;
mod tests;

pub use battle::{GameType, HpStatus, Player, Pokemon, PokemonDetails, Stat};
pub use global::SearchState;
pub use request::{
    ActivePokemon, BattleRequest, MaxMoveSlot, MaxMoves, MoveSlot, PokemonStats, RequestKind,
    SideInfo, SidePokemon, ZMoveInfo,
};

use anyhow::Result;
use args::Args;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    // Global
    Challstr(String),
    UpdateUser {
        username: String,
        named: bool,
        avatar: String,
    },
    NameTaken {
        username: String,
        message: String,
    },
    Popup(String),
    Pm {
        sender: String,
        receiver: String,
        message: String,
    },
    Formats(Vec<String>),
    UpdateSearch(SearchState),

    // Battle initialization
    Init(String),
    Title(String),
    BattlePlayer {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    TeamSize {
        player: Player,
        size: u8,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rated(Option<String>),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    TeamPreview(Option<u8>),
    BattleStart,

    // Battle progress
    Request(Box<BattleRequest>),
    Inactive(String),
    InactiveOff(String),
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,
    Expire(String),
    Error(String),
    BigError(String),

    // Major actions
    Move {
        pokemon: Pokemon,
        move_name: String,
        target: Option<Pokemon>,
        miss: bool,
    },
    Switch {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Drag {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    DetailsChange {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Replace {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Swap {
        pokemon: Pokemon,
        position: u8,
    },
    Cant {
        pokemon: Pokemon,
        reason: String,
        move_name: Option<String>,
    },
    Faint(Pokemon),

    // Minor actions
    Damage {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
    },
    Heal {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
    },
    SetHp {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
    },
    Status {
        pokemon: Pokemon,
        status: String,
    },
    CureStatus {
        pokemon: Pokemon,
        status: String,
    },
    CureTeam(Pokemon),
    Boost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    Unboost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    SetBoost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    ClearBoost(Pokemon),
    ClearAllBoost,
    Weather {
        weather: String,
        upkeep: bool,
    },
    VolatileStart {
        pokemon: Pokemon,
        effect: String,
    },
    VolatileEnd {
        pokemon: Pokemon,
        effect: String,
    },
    Item {
        pokemon: Pokemon,
        item: String,
        from: Option<String>,
    },
    EndItem {
        pokemon: Pokemon,
        item: String,
        from: Option<String>,
    },
    Ability {
        pokemon: Pokemon,
        ability: String,
        from: Option<String>,
    },
    Mega {
        pokemon: Pokemon,
        megastone: String,
    },
    ZPower(Pokemon),
    Terastallize {
        pokemon: Pokemon,
        tera_type: String,
    },

    Raw(String),
}

/// Fieldless tag for each [`ServerMessage`] variant, used to key handler tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Challstr,
    UpdateUser,
    NameTaken,
    Popup,
    Pm,
    Formats,
    UpdateSearch,
    Init,
    Title,
    Player,
    TeamSize,
    GameType,
    Gen,
    Tier,
    Rated,
    Rule,
    ClearPoke,
    Poke,
    TeamPreview,
    Start,
    Request,
    Inactive,
    InactiveOff,
    Upkeep,
    Turn,
    Win,
    Tie,
    Expire,
    Error,
    BigError,
    Move,
    Switch,
    Drag,
    DetailsChange,
    Replace,
    Swap,
    Cant,
    Faint,
    Damage,
    Heal,
    SetHp,
    Status,
    CureStatus,
    CureTeam,
    Boost,
    Unboost,
    SetBoost,
    ClearBoost,
    ClearAllBoost,
    Weather,
    VolatileStart,
    VolatileEnd,
    Item,
    EndItem,
    Ability,
    Mega,
    ZPower,
    Terastallize,
    Raw,
}

impl ServerMessage {
    pub fn kind(&self) -> MessageKind {
        use ServerMessage as M;
        match self {
            M::Challstr(_) => MessageKind::Challstr,
            M::UpdateUser { .. } => MessageKind::UpdateUser,
            M::NameTaken { .. } => MessageKind::NameTaken,
            M::Popup(_) => MessageKind::Popup,
            M::Pm { .. } => MessageKind::Pm,
            M::Formats(_) => MessageKind::Formats,
            M::UpdateSearch(_) => MessageKind::UpdateSearch,
            M::Init(_) => MessageKind::Init,
            M::Title(_) => MessageKind::Title,
            M::BattlePlayer { .. } => MessageKind::Player,
            M::TeamSize { .. } => MessageKind::TeamSize,
            M::GameType(_) => MessageKind::GameType,
            M::Gen(_) => MessageKind::Gen,
            M::Tier(_) => MessageKind::Tier,
            M::Rated(_) => MessageKind::Rated,
            M::Rule(_) => MessageKind::Rule,
            M::ClearPoke => MessageKind::ClearPoke,
            M::Poke { .. } => MessageKind::Poke,
            M::TeamPreview(_) => MessageKind::TeamPreview,
            M::BattleStart => MessageKind::Start,
            M::Request(_) => MessageKind::Request,
            M::Inactive(_) => MessageKind::Inactive,
            M::InactiveOff(_) => MessageKind::InactiveOff,
            M::Upkeep => MessageKind::Upkeep,
            M::Turn(_) => MessageKind::Turn,
            M::Win(_) => MessageKind::Win,
            M::Tie => MessageKind::Tie,
            M::Expire(_) => MessageKind::Expire,
            M::Error(_) => MessageKind::Error,
            M::BigError(_) => MessageKind::BigError,
            M::Move { .. } => MessageKind::Move,
            M::Switch { .. } => MessageKind::Switch,
            M::Drag { .. } => MessageKind::Drag,
            M::DetailsChange { .. } => MessageKind::DetailsChange,
            M::Replace { .. } => MessageKind::Replace,
            M::Swap { .. } => MessageKind::Swap,
            M::Cant { .. } => MessageKind::Cant,
            M::Faint(_) => MessageKind::Faint,
            M::Damage { .. } => MessageKind::Damage,
            M::Heal { .. } => MessageKind::Heal,
            M::SetHp { .. } => MessageKind::SetHp,
            M::Status { .. } => MessageKind::Status,
            M::CureStatus { .. } => MessageKind::CureStatus,
            M::CureTeam(_) => MessageKind::CureTeam,
            M::Boost { .. } => MessageKind::Boost,
            M::Unboost { .. } => MessageKind::Unboost,
            M::SetBoost { .. } => MessageKind::SetBoost,
            M::ClearBoost(_) => MessageKind::ClearBoost,
            M::ClearAllBoost => MessageKind::ClearAllBoost,
            M::Weather { .. } => MessageKind::Weather,
            M::VolatileStart { .. } => MessageKind::VolatileStart,
            M::VolatileEnd { .. } => MessageKind::VolatileEnd,
            M::Item { .. } => MessageKind::Item,
            M::EndItem { .. } => MessageKind::EndItem,
            M::Ability { .. } => MessageKind::Ability,
            M::Mega { .. } => MessageKind::Mega,
            M::ZPower(_) => MessageKind::ZPower,
            M::Terastallize { .. } => MessageKind::Terastallize,
            M::Raw(_) => MessageKind::Raw,
        }
    }
}

/// One inbound line together with its classification
#[derive(Debug, Clone, PartialEq)]
pub struct ServerLine {
    /// Line exactly as received
    pub text: String,
    pub message: ServerMessage,
}

impl ServerLine {
    /// Classify a line. Never fails: anything unparseable becomes [`ServerMessage::Raw`].
    pub fn parse(text: &str) -> Self {
        let message = parse_server_message(text).unwrap_or_else(|e| {
            tracing::debug!(line = text, error = %e, "unparsed server line");
            ServerMessage::Raw(text.trim().to_string())
        });

        Self {
            text: text.to_string(),
            message,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.message.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub lines: Vec<ServerLine>,
}

impl ServerFrame {
    /// Battle room id, if this frame belongs to a battle
    pub fn battle_id(&self) -> Option<&str> {
        self.room_id
            .as_deref()
            .filter(|room| room.starts_with("battle-"))
    }
}

/// Split a complete WebSocket frame into classified lines
pub fn parse_server_frame(frame: &str) -> ServerFrame {
    let mut lines = frame.lines();

    // Check if first line is >ROOMID
    let room_id = frame
        .lines()
        .next()
        .and_then(|line| line.strip_prefix('>'))
        .map(|room| room.trim().to_string());
    if room_id.is_some() {
        lines.next();
    }

    let lines = lines
        .filter(|line| !line.trim().is_empty())
        .map(ServerLine::parse)
        .collect();

    ServerFrame { room_id, lines }
}

/// Parse a single line from the server into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Ok(ServerMessage::Raw(String::new()));
    }

    if !line.starts_with('|') {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() < 2 {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let args = Args::new(&parts);
    match parts[1] {
        // Global
        "challstr" => global::parse_challstr(&parts),
        "updateuser" => global::parse_updateuser(&parts),
        "nametaken" => global::parse_nametaken(&parts),
        "popup" => global::parse_popup(&parts),
        "pm" => global::parse_pm(&parts),
        "formats" => global::parse_formats(&parts),
        "updatesearch" => global::parse_updatesearch(&parts),

        // Battle initialization
        "init" => battle_init::parse_init(&args),
        "title" => battle_init::parse_title(&args),
        "player" => battle_init::parse_player(&args),
        "teamsize" => battle_init::parse_teamsize(&args),
        "gametype" => battle_init::parse_gametype(&args),
        "gen" => battle_init::parse_gen(&args),
        "tier" => battle_init::parse_tier(&args),
        "rated" => battle_init::parse_rated(&args),
        "rule" => battle_init::parse_rule(&args),
        "clearpoke" => Ok(ServerMessage::ClearPoke),
        "poke" => battle_init::parse_poke(&args),
        "teampreview" => battle_init::parse_teampreview(&args),
        "start" => Ok(ServerMessage::BattleStart),

        // Battle progress
        "request" => battle_progress::parse_request(&args),
        "inactive" => battle_progress::parse_inactive(&args),
        "inactiveoff" => battle_progress::parse_inactiveoff(&args),
        "upkeep" => Ok(ServerMessage::Upkeep),
        "turn" => battle_progress::parse_turn(&args),
        "win" => battle_progress::parse_win(&args),
        "tie" => Ok(ServerMessage::Tie),
        "expire" => battle_progress::parse_expire(&args),
        "error" => battle_progress::parse_error(&args),
        "bigerror" => battle_progress::parse_bigerror(&args),

        // Major actions
        "move" => battle_major::parse_move(&args),
        "switch" => battle_major::parse_switch(&args),
        "drag" => battle_major::parse_drag(&args),
        "detailschange" => battle_major::parse_detailschange(&args),
        "replace" => battle_major::parse_replace(&args),
        "swap" => battle_major::parse_swap(&args),
        "cant" => battle_major::parse_cant(&args),
        "faint" => battle_major::parse_faint(&args),

        // Minor actions
        "-damage" => battle_minor::parse_damage(&args),
        "-heal" => battle_minor::parse_heal(&args),
        "-sethp" => battle_minor::parse_sethp(&args),
        "-status" => battle_minor::parse_status(&args),
        "-curestatus" => battle_minor::parse_curestatus(&args),
        "-cureteam" => battle_minor::parse_cureteam(&args),
        "-boost" => battle_minor::parse_boost(&args),
        "-unboost" => battle_minor::parse_unboost(&args),
        "-setboost" => battle_minor::parse_setboost(&args),
        "-clearboost" => battle_minor::parse_clearboost(&args),
        "-clearallboost" => battle_minor::parse_clearallboost(&args),
        "-weather" => battle_minor::parse_weather(&args),
        "-start" => battle_minor::parse_start(&args),
        "-end" => battle_minor::parse_end(&args),
        "-item" => battle_minor::parse_item(&args),
        "-enditem" => battle_minor::parse_enditem(&args),
        "-ability" => battle_minor::parse_ability(&args),
        "-mega" => battle_minor::parse_mega(&args),
        "-zpower" => battle_minor::parse_zpower(&args),
        "-terastallize" => battle_minor::parse_terastallize(&args),

        _ => Ok(ServerMessage::Raw(line.to_string())),
    }
}
