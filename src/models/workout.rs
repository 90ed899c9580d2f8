use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::exercise::{CreateExercise, Exercise};
use super::FromSqliteRow;

pub const DIAS_SEMANA: &[&str] = &[
    "segunda-feira",
    "terca-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sabado",
    "domingo",
];

pub fn is_dia_semana(dia: &str) -> bool {
    DIAS_SEMANA.contains(&dia)
}

/// Minimal student reference embedded in workout responses.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRef {
    pub id: String,
    pub nome: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: String,
    pub nome: String,
    pub dia_semana: String,
    pub personal_id: String,
    pub aluno_id: Option<String>,
    pub data_criacao: DateTime<Utc>,
    pub data_atualizacao: Option<DateTime<Utc>>,
    pub aluno: Option<StudentRef>,
    pub exercicios: Vec<Exercise>,
}

impl Workout {
    pub fn owned_by(&self, user_id: &str) -> bool {
        self.personal_id == user_id
    }

    pub fn assigned_to(&self, user_id: &str) -> bool {
        self.aluno_id.as_deref() == Some(user_id)
    }

    /// Owning trainer and assigned student may read the workout.
    pub fn readable_by(&self, user_id: &str) -> bool {
        self.owned_by(user_id) || self.assigned_to(user_id)
    }

    /// Completion flags may be toggled by exactly the users who can read.
    pub fn completion_editable_by(&self, user_id: &str) -> bool {
        self.readable_by(user_id)
    }
}

impl FromSqliteRow for Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nome: row.get("nome")?,
            dia_semana: row.get("dia_semana")?,
            personal_id: row.get("personal_id")?,
            aluno_id: row.get("aluno_id")?,
            data_criacao: row.get("data_criacao")?,
            data_atualizacao: row.get("data_atualizacao")?,
            aluno: None,
            exercicios: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkout {
    pub nome: String,
    #[serde(rename = "diaSemana")]
    pub dia_semana: String,
    #[serde(rename = "alunoId")]
    pub aluno_id: Option<String>,
    #[serde(default)]
    pub exercicios: Vec<CreateExercise>,
}

/// Detached projection returned by the copy endpoint. Never persisted and
/// never carries an assigned student.
#[derive(Debug, Serialize)]
pub struct WorkoutCopy {
    pub nome: String,
    #[serde(rename = "diaSemana")]
    pub dia_semana: String,
    pub aluno: Option<StudentRef>,
    pub exercicios: Vec<WorkoutCopyExercise>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutCopyExercise {
    pub nome: String,
    pub series: i64,
    pub repeticoes: i64,
    pub observacoes: String,
}

impl WorkoutCopy {
    pub fn from_workout(workout: &Workout) -> Self {
        Self {
            nome: format!("Cópia de {}", workout.nome),
            dia_semana: workout.dia_semana.clone(),
            aluno: None,
            exercicios: workout
                .exercicios
                .iter()
                .map(|ex| WorkoutCopyExercise {
                    nome: ex.nome.clone(),
                    series: ex.series,
                    repeticoes: ex.repeticoes,
                    observacoes: ex.observacoes.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workout(personal_id: &str, aluno_id: Option<&str>) -> Workout {
        Workout {
            id: "t1".to_string(),
            nome: "Leg Day".to_string(),
            dia_semana: "segunda-feira".to_string(),
            personal_id: personal_id.to_string(),
            aluno_id: aluno_id.map(|s| s.to_string()),
            data_criacao: Utc::now(),
            data_atualizacao: None,
            aluno: None,
            exercicios: Vec::new(),
        }
    }

    #[test]
    fn test_owner_can_read_and_toggle() {
        let w = workout("p1", Some("a1"));
        assert!(w.readable_by("p1"));
        assert!(w.completion_editable_by("p1"));
    }

    #[test]
    fn test_assigned_student_can_read_and_toggle() {
        let w = workout("p1", Some("a1"));
        assert!(w.readable_by("a1"));
        assert!(w.completion_editable_by("a1"));
    }

    #[test]
    fn test_third_party_has_no_access() {
        let w = workout("p1", Some("a1"));
        assert!(!w.readable_by("a2"));
        assert!(!w.completion_editable_by("a2"));
        assert!(!w.owned_by("a1"));
    }

    #[test]
    fn test_unassigned_workout_readable_only_by_owner() {
        let w = workout("p1", None);
        assert!(w.readable_by("p1"));
        assert!(!w.readable_by("a1"));
    }

    #[test]
    fn test_dia_semana_set() {
        assert!(is_dia_semana("segunda-feira"));
        assert!(is_dia_semana("domingo"));
        assert!(!is_dia_semana("segunda"));
        assert!(!is_dia_semana("monday"));
    }

    #[test]
    fn test_copy_prefixes_name_and_drops_student() {
        let mut w = workout("p1", Some("a1"));
        w.exercicios.push(Exercise {
            id: "e1".to_string(),
            treino_id: "t1".to_string(),
            nome: "Agachamento Livre".to_string(),
            series: 4,
            repeticoes: 10,
            observacoes: String::new(),
            concluido: true,
            ordem: 0,
        });
        let copy = WorkoutCopy::from_workout(&w);
        assert_eq!(copy.nome, "Cópia de Leg Day");
        assert!(copy.aluno.is_none());
        assert_eq!(copy.exercicios.len(), 1);
        assert_eq!(copy.exercicios[0].series, 4);
    }
}
