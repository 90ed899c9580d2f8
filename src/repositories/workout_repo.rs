use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::workout::StudentRef;
use crate::models::{CreateExercise, Exercise, FromSqliteRow, Workout};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a workout and its exercises in one transaction. Exercise order
    /// is the position in the submitted list.
    pub async fn create(
        &self,
        personal_id: &str,
        nome: &str,
        dia_semana: &str,
        aluno_id: Option<String>,
        exercicios: Vec<CreateExercise>,
    ) -> Result<Workout> {
        let pool = self.pool.clone();
        let personal_id = personal_id.to_string();
        let nome = nome.to_string();
        let dia_semana = dia_semana.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;

            let id = Uuid::new_v4().to_string();
            let now = Utc::now();
            tx.execute(
                "INSERT INTO treinos (id, nome, dia_semana, personal_id, aluno_id, data_criacao)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, nome, dia_semana, personal_id, aluno_id, now],
            )?;

            insert_exercises(&tx, &id, &exercicios)?;
            tx.commit()?;

            let workout = load_workout(&conn, &id)?
                .ok_or_else(|| AppError::Internal("workout vanished after insert".to_string()))?;
            Ok(workout)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            load_workout(&conn, &id)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_trainer(&self, personal_id: &str) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let personal_id = personal_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM treinos WHERE personal_id = ? ORDER BY data_criacao DESC",
            )?;
            let workouts = stmt
                .query_map([&personal_id], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            workouts
                .into_iter()
                .map(|w| assemble(&conn, w))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_student(&self, aluno_id: &str) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let aluno_id = aluno_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT * FROM treinos WHERE aluno_id = ? ORDER BY data_criacao DESC")?;
            let workouts = stmt
                .query_map([&aluno_id], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            workouts
                .into_iter()
                .map(|w| assemble(&conn, w))
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Update workout fields and replace the exercise list in one
    /// transaction, so a failed insert never leaves the old and new lists
    /// half mixed. Completion flags start over with the new list.
    pub async fn update(
        &self,
        id: &str,
        nome: &str,
        dia_semana: &str,
        aluno_id: Option<String>,
        exercicios: Vec<CreateExercise>,
    ) -> Result<Workout> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let nome = nome.to_string();
        let dia_semana = dia_semana.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;

            let now = Utc::now();
            tx.execute(
                "UPDATE treinos SET nome = ?, dia_semana = ?, aluno_id = ?, data_atualizacao = ?
                 WHERE id = ?",
                rusqlite::params![nome, dia_semana, aluno_id, now, id],
            )?;
            tx.execute("DELETE FROM exercicios WHERE treino_id = ?", [&id])?;
            insert_exercises(&tx, &id, &exercicios)?;
            tx.commit()?;

            let workout = load_workout(&conn, &id)?
                .ok_or_else(|| AppError::Internal("workout vanished after update".to_string()))?;
            Ok(workout)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM exercicios WHERE treino_id = ?", [&id])?;
            let rows = tx.execute("DELETE FROM treinos WHERE id = ?", [&id])?;
            tx.commit()?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Drop every workout owned by the trainer for the given student.
    /// Used when a student is unlinked.
    pub async fn delete_for_pair(&self, personal_id: &str, aluno_id: &str) -> Result<usize> {
        let pool = self.pool.clone();
        let personal_id = personal_id.to_string();
        let aluno_id = aluno_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM exercicios WHERE treino_id IN
                   (SELECT id FROM treinos WHERE personal_id = ? AND aluno_id = ?)",
                rusqlite::params![personal_id, aluno_id],
            )?;
            let rows = tx.execute(
                "DELETE FROM treinos WHERE personal_id = ? AND aluno_id = ?",
                rusqlite::params![personal_id, aluno_id],
            )?;
            tx.commit()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Flip the completion flag of a single exercise, returning the updated
    /// row, or `None` when the exercise is not part of that workout.
    pub async fn set_exercise_completion(
        &self,
        treino_id: &str,
        exercicio_id: &str,
        concluido: bool,
    ) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let treino_id = treino_id.to_string();
        let exercicio_id = exercicio_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE exercicios SET concluido = ? WHERE id = ? AND treino_id = ?",
                rusqlite::params![concluido, exercicio_id, treino_id],
            )?;
            if rows == 0 {
                return Ok(None);
            }
            let mut stmt =
                conn.prepare("SELECT * FROM exercicios WHERE id = ? AND treino_id = ?")?;
            let exercise = stmt
                .query_row(rusqlite::params![exercicio_id, treino_id], Exercise::from_row)
                .optional()?;
            Ok(exercise)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn reset_completion(&self, treino_id: &str) -> Result<usize> {
        let pool = self.pool.clone();
        let treino_id = treino_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE exercicios SET concluido = 0 WHERE treino_id = ?",
                [&treino_id],
            )?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn insert_exercises(conn: &Connection, treino_id: &str, exercicios: &[CreateExercise]) -> Result<()> {
    for (ordem, ex) in exercicios.iter().enumerate() {
        conn.execute(
            "INSERT INTO exercicios (id, treino_id, nome, series, repeticoes, observacoes, concluido, ordem)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                treino_id,
                ex.nome,
                ex.series,
                ex.repeticoes,
                ex.observacoes.clone().unwrap_or_default(),
                ordem as i64
            ],
        )?;
    }
    Ok(())
}

fn load_workout(conn: &Connection, id: &str) -> Result<Option<Workout>> {
    let mut stmt = conn.prepare("SELECT * FROM treinos WHERE id = ?")?;
    let workout = stmt.query_row([id], Workout::from_row).optional()?;
    match workout {
        Some(w) => Ok(Some(assemble(conn, w)?)),
        None => Ok(None),
    }
}

fn assemble(conn: &Connection, mut workout: Workout) -> Result<Workout> {
    let mut stmt =
        conn.prepare("SELECT * FROM exercicios WHERE treino_id = ? ORDER BY ordem")?;
    workout.exercicios = stmt
        .query_map([&workout.id], Exercise::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if let Some(aluno_id) = &workout.aluno_id {
        let mut stmt = conn.prepare("SELECT id, nome FROM usuarios WHERE id = ?")?;
        workout.aluno = stmt
            .query_row([aluno_id], |row| {
                Ok(StudentRef {
                    id: row.get("id")?,
                    nome: row.get("nome")?,
                })
            })
            .optional()?;
    }

    Ok(workout)
}
