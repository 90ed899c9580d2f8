use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "personal")]
    Trainer,
    #[serde(rename = "aluno")]
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Trainer => "personal",
            UserRole::Student => "aluno",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(UserRole::Trainer),
            "aluno" => Some(UserRole::Student),
            _ => None,
        }
    }

    pub fn is_trainer(&self) -> bool {
        matches!(self, UserRole::Trainer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub senha_hash: String,
    pub tipo: UserRole,
    /// 6-digit linkage code, trainers only.
    pub codigo_personal: Option<String>,
    /// The student's trainer. Retained when the student is unlinked so the
    /// link can be reactivated later.
    pub personal_id: Option<String>,
    pub desvinculado: bool,
    pub criado_em: DateTime<Utc>,
}

impl User {
    /// A student counts as linked only while the unlink flag is clear.
    pub fn has_active_link(&self) -> bool {
        self.personal_id.is_some() && !self.desvinculado
    }

    pub fn is_active_student_of(&self, trainer_id: &str) -> bool {
        self.personal_id.as_deref() == Some(trainer_id) && !self.desvinculado
    }
}

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let tipo_str: String = row.get("tipo")?;
        let tipo = UserRole::parse(&tipo_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("tipo de usuário desconhecido: {tipo_str}").into(),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            nome: row.get("nome")?,
            email: row.get("email")?,
            senha_hash: row.get("senha_hash")?,
            tipo,
            codigo_personal: row.get("codigo_personal")?,
            personal_id: row.get("personal_id")?,
            desvinculado: row.get("desvinculado")?,
            criado_em: row.get("criado_em")?,
        })
    }
}

/// The `usuario` object returned by the auth endpoints.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub tipo: UserRole,
    #[serde(rename = "codigoPersonal")]
    pub codigo_personal: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            nome: user.nome.clone(),
            email: user.email.clone(),
            tipo: user.tipo,
            codigo_personal: user.codigo_personal.clone(),
        }
    }
}

/// Slim listing row for a trainer's students.
#[derive(Debug, Serialize)]
pub struct StudentSummary {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub desvinculado: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub tipo: String,
    #[serde(rename = "codigoPersonal")]
    pub codigo_personal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
    #[serde(rename = "novoCodigoPersonal")]
    pub novo_codigo_personal: Option<String>,
}
