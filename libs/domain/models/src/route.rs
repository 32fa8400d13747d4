// [libs/domain/models/src/route.rs]
//! Identificadores de shard geografico (rutas) y su mapeo a hosts upstream.
//!
//! Las rutas se particionan en dos familias: plataformas (finas, por
//! servidor, usadas por los endpoints de liga/ranked) y regiones (gruesas,
//! usadas por los endpoints de match-v5). Cada job objetivo exactamente una
//! ruta; la familia determina que conjunto de endpoints puede invocar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shard de plataforma (servidor individual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Na1,
    Euw1,
    Eun1,
    Kr,
    Jp1,
    Br1,
    La1,
    La2,
    Oc1,
    Tr1,
    Ru,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[
        Platform::Na1,
        Platform::Euw1,
        Platform::Eun1,
        Platform::Kr,
        Platform::Jp1,
        Platform::Br1,
        Platform::La1,
        Platform::La2,
        Platform::Oc1,
        Platform::Tr1,
        Platform::Ru,
    ];

    /// Nombre estable usado como clave de limitador y columna de persistencia.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Na1 => "na1",
            Platform::Euw1 => "euw1",
            Platform::Eun1 => "eun1",
            Platform::Kr => "kr",
            Platform::Jp1 => "jp1",
            Platform::Br1 => "br1",
            Platform::La1 => "la1",
            Platform::La2 => "la2",
            Platform::Oc1 => "oc1",
            Platform::Tr1 => "tr1",
            Platform::Ru => "ru",
        }
    }

    /// Host upstream para este shard de plataforma.
    pub fn host(self) -> String {
        format!("{}.api.riotgames.com", self.name())
    }

    /// Region de match-v5 a la que enruta este shard de plataforma.
    pub fn region(self) -> Region {
        match self {
            Platform::Na1 | Platform::Br1 | Platform::La1 | Platform::La2 | Platform::Oc1 => {
                Region::Americas
            }
            Platform::Euw1 | Platform::Eun1 | Platform::Tr1 | Platform::Ru => Region::Europe,
            Platform::Kr | Platform::Jp1 => Region::Asia,
        }
    }

    pub fn parse(name: &str) -> Option<Platform> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shard de region (agregado de plataformas, usado por match-v5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Americas,
    Europe,
    Asia,
    Sea,
}

impl Region {
    pub const ALL: &'static [Region] =
        &[Region::Americas, Region::Europe, Region::Asia, Region::Sea];

    pub fn name(self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::Sea => "sea",
        }
    }

    pub fn host(self) -> String {
        format!("{}.api.riotgames.com", self.name())
    }

    pub fn parse(name: &str) -> Option<Region> {
        Self::ALL.iter().copied().find(|r| r.name() == name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Una ruta concreta: o bien una plataforma, o bien una region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Platform(Platform),
    Region(Region),
}

impl Route {
    /// Nombre estable usado como clave de limitador de tasa.
    pub fn name(self) -> &'static str {
        match self {
            Route::Platform(p) => p.name(),
            Route::Region(r) => r.name(),
        }
    }

    pub fn host(self) -> String {
        match self {
            Route::Platform(p) => p.host(),
            Route::Region(r) => r.host(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Platform> for Route {
    fn from(p: Platform) -> Self {
        Route::Platform(p)
    }
}

impl From<Region> for Route {
    fn from(r: Region) -> Self {
        Route::Region(r)
    }
}
