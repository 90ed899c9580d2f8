use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::Rng;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, StudentSummary, User, UserRole};

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM usuarios WHERE id = ?")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM usuarios WHERE email = ?")?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create(
        &self,
        nome: &str,
        email: &str,
        senha: &str,
        tipo: UserRole,
        codigo_personal: Option<String>,
        personal_id: Option<String>,
    ) -> Result<User> {
        let senha_hash = hash_password(senha)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            nome: nome.to_string(),
            email: email.to_string(),
            senha_hash,
            tipo,
            codigo_personal,
            personal_id,
            desvinculado: false,
            criado_em: Utc::now(),
        };

        let pool = self.pool.clone();
        let user_clone = user.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO usuarios (id, nome, email, senha_hash, tipo, codigo_personal, personal_id, desvinculado, criado_em)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    user_clone.id,
                    user_clone.nome,
                    user_clone.email,
                    user_clone.senha_hash,
                    user_clone.tipo.as_str(),
                    user_clone.codigo_personal,
                    user_clone.personal_id,
                    user_clone.desvinculado,
                    user_clone.criado_em
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(user)
    }

    pub async fn verify_password(&self, email: &str, senha: &str) -> Result<Option<User>> {
        let user = self.find_by_email(email).await?;

        match user {
            Some(user) => {
                if verify_password(senha, &user.senha_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    pub async fn trainer_code_exists(&self, codigo: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let codigo = codigo.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let exists: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM usuarios WHERE codigo_personal = ? AND tipo = 'personal'",
                [&codigo],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Generate a 6-digit linkage code unique among trainers, by rejection
    /// sampling against the codes already issued.
    pub async fn generate_unique_code(&self) -> Result<String> {
        loop {
            let codigo = {
                let mut rng = rand::thread_rng();
                rng.gen_range(100_000..=999_999)
            }
            .to_string();

            if !self.trainer_code_exists(&codigo).await? {
                return Ok(codigo);
            }
        }
    }

    pub async fn find_trainer_by_code(&self, codigo: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let codigo = codigo.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn
                .prepare("SELECT * FROM usuarios WHERE codigo_personal = ? AND tipo = 'personal'")?;
            let result = stmt.query_row([&codigo], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_student(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM usuarios WHERE id = ? AND tipo = 'aluno'")?;
            let result = stmt.query_row([&id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_students(
        &self,
        personal_id: &str,
        desvinculado: bool,
    ) -> Result<Vec<StudentSummary>> {
        let pool = self.pool.clone();
        let personal_id = personal_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT id, nome, email, desvinculado FROM usuarios
                 WHERE personal_id = ? AND tipo = 'aluno' AND desvinculado = ?
                 ORDER BY nome",
            )?;
            let students = stmt
                .query_map(rusqlite::params![personal_id, desvinculado], |row| {
                    Ok(StudentSummary {
                        id: row.get("id")?,
                        nome: row.get("nome")?,
                        email: row.get("email")?,
                        desvinculado: row.get("desvinculado")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(students)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Set the unlink flag on a student of the given trainer. The trainer
    /// reference is kept so the link can be reactivated.
    pub async fn unlink(&self, student_id: &str, personal_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let student_id = student_id.to_string();
        let personal_id = personal_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE usuarios SET desvinculado = 1
                 WHERE id = ? AND personal_id = ? AND tipo = 'aluno' AND desvinculado = 0",
                rusqlite::params![student_id, personal_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Point a student at a (possibly new) trainer and clear the unlink flag.
    /// Idempotent when the link already exists.
    pub async fn relink(&self, student_id: &str, personal_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let student_id = student_id.to_string();
        let personal_id = personal_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE usuarios SET personal_id = ?, desvinculado = 0
                 WHERE id = ? AND tipo = 'aluno'",
                rusqlite::params![personal_id, student_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Restore a previously unlinked student of the given trainer.
    pub async fn reactivate(&self, student_id: &str, personal_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let student_id = student_id.to_string();
        let personal_id = personal_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE usuarios SET desvinculado = 0
                 WHERE id = ? AND personal_id = ? AND tipo = 'aluno' AND desvinculado = 1",
                rusqlite::params![student_id, personal_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn hash_password(senha: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let senha_hash = argon2
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(senha_hash)
}

fn verify_password(senha: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(senha.as_bytes(), &parsed_hash)
        .is_ok())
}
