//! Rubric catalog
//!
//! The ten competencies coordinators are evaluated on, each with a prompt and
//! a four-level rating scale. The table is static and immutable for the
//! process lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the free-text field attached to every competency
pub const DEVELOPMENT_NOTES_LABEL: &str = "Ações de Desenvolvimento";

/// Rating labels shared by every competency, indexed by `rating - 1`
pub const RATING_LABELS: [&str; 4] = [
    "Em desenvolvimento",
    "Consolidando práticas",
    "Avançado / Autônomo",
    "Estratégico / Referência",
];

/// Proficiency level on a competency (1 to 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Rating {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Shared label for this level
    pub fn label(self) -> &'static str {
        RATING_LABELS[self as usize - 1]
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::One),
            2 => Ok(Rating::Two),
            3 => Ok(Rating::Three),
            4 => Ok(Rating::Four),
            other => Err(format!("rating must be between 1 and 4, got {}", other)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// The closed set of evaluated competencies
///
/// Serialized with the identifiers used by the submission payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Competency {
    #[serde(rename = "integridade_responsabilidade_publica")]
    PublicIntegrity,
    #[serde(rename = "promocao_cultura_organizacional")]
    OrganizationalCulture,
    #[serde(rename = "gestao_administrativa_organizacional")]
    AdministrativeManagement,
    #[serde(rename = "gestao_pessoas_relacionamento_intersetorial")]
    PeopleManagement,
    #[serde(rename = "comunicacao_relacionamento_institucional")]
    InstitutionalCommunication,
    #[serde(rename = "tomada_decisao_analise_dados")]
    DataDrivenDecisions,
    #[serde(rename = "gestao_compras_orcamento")]
    ProcurementAndBudget,
    #[serde(rename = "gestao_infraestrutura_servicos")]
    InfrastructureAndServices,
    #[serde(rename = "controle_assiduidade_carga_horaria")]
    AttendanceAndWorkload,
    #[serde(rename = "articulacao_pedagogica_resultados")]
    PedagogicalArticulation,
}

impl Competency {
    /// Canonical presentation order
    pub const ALL: [Competency; 10] = [
        Competency::PublicIntegrity,
        Competency::OrganizationalCulture,
        Competency::AdministrativeManagement,
        Competency::PeopleManagement,
        Competency::InstitutionalCommunication,
        Competency::DataDrivenDecisions,
        Competency::ProcurementAndBudget,
        Competency::InfrastructureAndServices,
        Competency::AttendanceAndWorkload,
        Competency::PedagogicalArticulation,
    ];

    /// Wire identifier
    pub fn key(self) -> &'static str {
        match self {
            Competency::PublicIntegrity => "integridade_responsabilidade_publica",
            Competency::OrganizationalCulture => "promocao_cultura_organizacional",
            Competency::AdministrativeManagement => "gestao_administrativa_organizacional",
            Competency::PeopleManagement => "gestao_pessoas_relacionamento_intersetorial",
            Competency::InstitutionalCommunication => "comunicacao_relacionamento_institucional",
            Competency::DataDrivenDecisions => "tomada_decisao_analise_dados",
            Competency::ProcurementAndBudget => "gestao_compras_orcamento",
            Competency::InfrastructureAndServices => "gestao_infraestrutura_servicos",
            Competency::AttendanceAndWorkload => "controle_assiduidade_carga_horaria",
            Competency::PedagogicalArticulation => "articulacao_pedagogica_resultados",
        }
    }

    /// Parse a wire identifier
    pub fn from_key(key: &str) -> Option<Competency> {
        Competency::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Rubric for this competency
    pub fn definition(self) -> &'static CompetencyDefinition {
        &CATALOG[self as usize]
    }
}

impl fmt::Display for Competency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One level of a competency's rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingLevel {
    pub value: Rating,
    pub label: &'static str,
    pub description: &'static str,
}

/// Static rubric for one competency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompetencyDefinition {
    #[serde(rename = "key")]
    pub competency: Competency,
    pub title: &'static str,
    #[serde(rename = "question")]
    pub prompt: &'static str,
    /// Exactly four levels, ordered 1 to 4
    #[serde(rename = "options")]
    pub levels: [RatingLevel; 4],
    #[serde(rename = "development_actions_label")]
    pub notes_label: &'static str,
}

impl CompetencyDefinition {
    /// Description of the level with the given rating
    pub fn level(&self, rating: Rating) -> &RatingLevel {
        &self.levels[rating as usize - 1]
    }
}

/// Look up a rubric by raw identifier
///
/// Unknown identifiers are missing data, not an error.
pub fn lookup(key: &str) -> Option<&'static CompetencyDefinition> {
    Competency::from_key(key).map(Competency::definition)
}

/// The full catalog in canonical order
pub fn catalog() -> &'static [CompetencyDefinition; 10] {
    &CATALOG
}

const fn levels(d1: &'static str, d2: &'static str, d3: &'static str, d4: &'static str) -> [RatingLevel; 4] {
    [
        RatingLevel { value: Rating::One, label: RATING_LABELS[0], description: d1 },
        RatingLevel { value: Rating::Two, label: RATING_LABELS[1], description: d2 },
        RatingLevel { value: Rating::Three, label: RATING_LABELS[2], description: d3 },
        RatingLevel { value: Rating::Four, label: RATING_LABELS[3], description: d4 },
    ]
}

// Indexed by `Competency as usize`; order must match `Competency::ALL`.
static CATALOG: [CompetencyDefinition; 10] = [
    CompetencyDefinition {
        competency: Competency::PublicIntegrity,
        title: "Integridade e Responsabilidade Pública",
        prompt: "Como você avalia a capacidade do colaborador de agir com ética, cumprir normas e assegurar transparência nas suas ações?",
        levels: levels(
            "Cumpre orientações e demonstra compromisso ético.",
            "Aplica regras e normas com coerência e zelo.",
            "Garante transparência nas ações e registros sob sua gestão.",
            "Inspira conduta ética e consolida a cultura de integridade institucional.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::OrganizationalCulture,
        title: "Promoção da Cultura Organizacional",
        prompt: "Como você avalia a capacidade do colaborador de viver e multiplicar os valores, princípios e práticas organizacionais?",
        levels: levels(
            "Demonstra compreensão inicial dos valores institucionais e busca orientação para aplicá-los nas rotinas de trabalho.",
            "Aplica os valores e princípios do APG GOV nas interações diárias e nas decisões cotidianas.",
            "Engaja colegas e equipes na vivência dos princípios culturais, participa ativamente dos rituais e iniciativas.",
            "É referência em coerência cultural, inspira e orienta equipes na prática dos valores institucionais.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::AdministrativeManagement,
        title: "Gestão Administrativa e Organizacional",
        prompt: "Como você avalia a capacidade do colaborador de garantir a execução das rotinas administrativas e organizacionais de forma eficaz?",
        levels: levels(
            "Demonstra esforço em seguir rotinas com apoio.",
            "Cumpre prazos e registra corretamente as demandas administrativas.",
            "Organiza processos de forma autônoma e confiável.",
            "Estrutura sistemas que otimizam e garantem rastreabilidade das rotinas.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::PeopleManagement,
        title: "Gestão de Pessoas e Relacionamento Intersetorial",
        prompt: "Como você avalia a capacidade do colaborador de conduzir equipes com clareza e empatia, promovendo colaboração entre setores?",
        levels: levels(
            "Demonstra respeito e busca apoio para conduzir a equipe.",
            "Aplica práticas de liderança com diálogo e coerência.",
            "Engaja equipes e estimula colaboração intersetorial.",
            "Inspira e forma lideranças, promovendo cultura de cooperação entre áreas.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::InstitutionalCommunication,
        title: "Comunicação e Relacionamento Institucional",
        prompt: "Como você avalia a capacidade do colaborador de manter alinhamento com regionais, órgãos públicos e outros parceiros institucionais?",
        levels: levels(
            "Comunica-se de forma cordial e pontual.",
            "Transmite informações com clareza e responsabilidade.",
            "Mantém relacionamento construtivo com parceiros institucionais.",
            "Representa a instituição com credibilidade e promove integração entre redes.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::DataDrivenDecisions,
        title: "Tomada de Decisão e Análise de Dados",
        prompt: "Como você avalia a capacidade do colaborador de ler indicadores e tomar decisões baseadas em evidências?",
        levels: levels(
            "Analisa informações básicas com orientação.",
            "Utiliza dados disponíveis para decisões cotidianas.",
            "Interpreta indicadores e propõe ajustes assertivos.",
            "Orienta decisões estratégicas com base em evidências complexas.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::ProcurementAndBudget,
        title: "Gestão de Compras e Orçamento",
        prompt: "Como você avalia a capacidade do colaborador de garantir transparência e eficiência nos processos de compras e uso de recursos?",
        levels: levels(
            "Segue fluxos de compra com supervisão.",
            "Aplica corretamente os procedimentos e presta contas.",
            "Monitora orçamentos e assegura economicidade.",
            "Planeja e orienta decisões financeiras com visão institucional.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::InfrastructureAndServices,
        title: "Gestão de Infraestrutura e Serviços",
        prompt: "Como você avalia a capacidade do colaborador de coordenar manutenção e serviços, garantindo qualidade e cumprimento de prazos?",
        levels: levels(
            "Cumpre orientações sobre manutenção e serviços.",
            "Acompanha rotinas e comunica falhas com clareza.",
            "Garante qualidade e cronogramas de execução.",
            "Planeja melhorias estruturais e previne riscos operacionais.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::AttendanceAndWorkload,
        title: "Controle de Assiduidade e Carga Horária",
        prompt: "Como você avalia a capacidade do colaborador de monitorar a frequência e jornada de trabalho, assegurando conformidade?",
        levels: levels(
            "Registra e confere presença com apoio.",
            "Monitora frequência e comunica inconsistências.",
            "Controla escalas e ajusta jornada conforme normas.",
            "Analisa padrões e propõe soluções para otimização da assiduidade.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
    CompetencyDefinition {
        competency: Competency::PedagogicalArticulation,
        title: "Articulação Pedagógica para Resultados",
        prompt: "Como você avalia a capacidade do colaborador de conectar gestão administrativa aos resultados educacionais?",
        levels: levels(
            "Compreende os indicadores pedagógicos básicos.",
            "Colabora com a equipe pedagógica nas ações diárias.",
            "Integra dados administrativos aos resultados escolares.",
            "Atua estrategicamente para fortalecer os resultados educacionais da rede.",
        ),
        notes_label: DEVELOPMENT_NOTES_LABEL,
    },
];
