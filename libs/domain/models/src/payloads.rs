// [libs/domain/models/src/payloads.rs]
//! Formas de los cuerpos JSON que el upstream devuelve, y la proyeccion
//! normalizada minima que este pipeline persiste.
//!
//! `MatchDto`/`MatchParticipantDto` deliberadamente no reflejan el payload
//! completo de match-v5 (el original conserva decenas de campos de
//! `challenges`, `perks`, `objectives`...): aqui solo se conserva lo
//! suficiente para demostrar el contrato de extremo a extremo.

use serde::Deserialize;

/// Una entrada de la ladder de league-v4 (`/lol/league/v4/entries/...`).
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntryDto {
    pub puuid: String,
    #[serde(rename = "leaguePoints")]
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Respuesta de `/lol/match/v5/matches/by-puuid/{puuid}/ids`: un arreglo de
/// identificadores de partida.
pub type MatchIdsResponse = Vec<String>;

/// Respuesta de `/lol/match/v5/matches/{matchId}`, recortada a la proyeccion
/// que este pipeline persiste en `matches`/`match_participants`.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadataDto,
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchMetadataDto {
    #[serde(rename = "matchId")]
    pub match_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchInfoDto {
    #[serde(rename = "gameDuration")]
    pub game_duration: i64,
    #[serde(rename = "gameMode")]
    pub game_mode: String,
    #[serde(rename = "gameVersion")]
    pub game_version: String,
    #[serde(rename = "queueId")]
    pub queue_id: i64,
    #[serde(rename = "gameStartTimestamp")]
    pub game_start_timestamp: i64,
    pub participants: Vec<MatchParticipantDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchParticipantDto {
    pub puuid: String,
    #[serde(rename = "teamId")]
    pub team_id: i64,
    #[serde(rename = "championName")]
    pub champion_name: String,
    pub win: bool,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
}

/// Fila normalizada de la tabla `matches`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub match_id: String,
    pub region_name: String,
    pub game_duration: i64,
    pub game_mode: String,
    pub game_version: String,
    pub queue_id: i64,
    pub game_start_timestamp: i64,
}

/// Fila normalizada de la tabla `match_participants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchParticipantRow {
    pub match_id: String,
    pub puuid: String,
    pub team_id: i64,
    pub champion_name: String,
    pub win: bool,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
}

impl MatchDto {
    /// Proyecta el DTO upstream a las filas que `collector-infra-db` inserta.
    pub fn into_rows(self, region_name: &str) -> (MatchRow, Vec<MatchParticipantRow>) {
        let match_id = self.metadata.match_id;
        let row = MatchRow {
            match_id: match_id.clone(),
            region_name: region_name.to_string(),
            game_duration: self.info.game_duration,
            game_mode: self.info.game_mode,
            game_version: self.info.game_version,
            queue_id: self.info.queue_id,
            game_start_timestamp: self.info.game_start_timestamp,
        };
        let participants = self
            .info
            .participants
            .into_iter()
            .map(|p| MatchParticipantRow {
                match_id: match_id.clone(),
                puuid: p.puuid,
                team_id: p.team_id,
                champion_name: p.champion_name,
                win: p.win,
                kills: p.kills,
                deaths: p.deaths,
                assists: p.assists,
            })
            .collect();
        (row, participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_dto_projects_into_rows() {
        let raw = json!({
            "metadata": {"matchId": "NA1_1234"},
            "info": {
                "gameDuration": 1800,
                "gameMode": "CLASSIC",
                "gameVersion": "14.1.1",
                "queueId": 420,
                "gameStartTimestamp": 1_700_000_000_000_i64,
                "participants": [
                    {"puuid": "abc", "teamId": 100, "championName": "Ahri", "win": true, "kills": 5, "deaths": 2, "assists": 10}
                ]
            }
        });
        let dto: MatchDto = serde_json::from_value(raw).unwrap();
        let (row, participants) = dto.into_rows("americas");
        assert_eq!(row.match_id, "NA1_1234");
        assert_eq!(row.region_name, "americas");
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].champion_name, "Ahri");
    }
}
