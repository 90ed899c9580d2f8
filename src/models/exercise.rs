use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// Closed catalog of movements a workout may reference. Exercise names are
/// validated against this list at the API boundary, not by the storage layer.
pub const CATALOGO_EXERCICIOS: &[&str] = &[
    "Agachamento Livre",
    "Agachamento Hack",
    "Cadeira Extensora dropset",
    "Afundo com halteres",
    "Leg press45",
    "Panturrilha sentado",
    "Puxada Supinada",
    "Remada Baixa com triangulo",
    "remada curva na polia com corda",
    "serrote",
    "Rosca direta com halteres",
    "Abdominal remador",
    "Mesa flexora",
    "Stiff com halteres",
    "bulgaro",
    "terra sumô",
    "Gluteo na polia",
    "Elevação pelvica com barra",
    "Supino Inclinado com halteres",
    "Desenvolvimento com barra no banco",
    "elevação lateral",
    "elevação frontal",
    "triceps coice com halter unilateral",
    "triceps polia barra reta",
    "abdominal prancha",
    "abdominal bicicleta",
    "agachamento barra livre",
    "stiff com barra",
    "mesa flexora",
    "cadeira extensora unilateral",
    "abdução de quadril na polia",
    "elevação pelvica na barra",
];

pub fn is_cataloged(nome: &str) -> bool {
    CATALOGO_EXERCICIOS.contains(&nome)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub treino_id: String,
    pub nome: String,
    pub series: i64,
    pub repeticoes: i64,
    pub observacoes: String,
    pub concluido: bool,
    pub ordem: i64,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            treino_id: row.get("treino_id")?,
            nome: row.get("nome")?,
            series: row.get("series")?,
            repeticoes: row.get("repeticoes")?,
            observacoes: row.get("observacoes")?,
            concluido: row.get("concluido")?,
            ordem: row.get("ordem")?,
        })
    }
}

/// Exercise as submitted when creating or updating a workout. Order comes
/// from its position in the submitted list, never from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExercise {
    pub nome: String,
    pub series: i64,
    pub repeticoes: i64,
    pub observacoes: Option<String>,
}
