//! # Léxico do Espanhol (Argentina)
//!
//! Listas que alimentam o motor de regras e as features de gazetteer:
//! nomes próprios e sobrenomes frequentes, topônimos (com ênfase no noroeste
//! argentino), organizações públicas e palavras capitalizadas que **não** são
//! entidades no jargão judicial ("DNI", "Expediente", "Señor"...).

/// Primeiros nomes frequentes.
pub const FIRST_NAMES: &[&str] = &[
    "Juan", "José", "Luis", "Carlos", "Jorge", "Miguel", "Pedro", "Ramón", "Raúl",
    "Roberto", "Ricardo", "Sergio", "Daniel", "Diego", "Pablo", "Martín", "Marcelo",
    "Gustavo", "Fernando", "Alejandro", "Andrés", "Héctor", "Hugo", "Mario", "Oscar",
    "Rubén", "Walter", "Facundo", "Matías", "Nicolás", "Gonzalo", "Lucas", "Santiago",
    "Federico", "Ezequiel", "Agustín", "Joaquín", "Tomás", "Ignacio", "Esteban",
    "Alberto", "Eduardo", "Javier", "Rodolfo",
    "María", "Ana", "Laura", "Silvia", "Graciela", "Patricia", "Claudia", "Mónica",
    "Susana", "Marta", "Norma", "Rosa", "Carmen", "Gabriela", "Verónica", "Mariana",
    "Lorena", "Natalia", "Paula", "Florencia", "Valeria", "Carolina", "Sofía",
    "Lucía", "Camila", "Julieta", "Agustina", "Milagros", "Romina", "Soledad",
    "Elena", "Beatriz", "Alicia", "Teresa", "Inés", "Noelia", "Yanina", "Celeste",
];

/// Sobrenomes frequentes.
pub const SURNAMES: &[&str] = &[
    "Pérez", "González", "Rodríguez", "Gómez", "Fernández", "López", "Díaz",
    "Martínez", "Sánchez", "Romero", "Sosa", "Álvarez", "Torres", "Ruiz", "Ramírez",
    "Flores", "Acosta", "Benítez", "Medina", "Suárez", "Herrera", "Aguirre",
    "Giménez", "Gutiérrez", "Pereyra", "Rojas", "Molina", "Castro", "Ortiz",
    "Silva", "Núñez", "Luna", "Juárez", "Cabrera", "Ríos", "Morales", "Godoy",
    "Moreno", "Ferreyra", "Domínguez", "Carrizo", "Peralta", "Castillo", "Ledesma",
    "Quiroga", "Vega", "Vera", "Muñoz", "Ojeda", "Ponce", "Villalba", "Cardozo",
    "Mamaní", "Mamani", "Quispe", "Choque", "Cruz", "Vargas", "Tolaba", "Condori",
    "Guanuco", "Zerpa", "Alancay", "Chauque", "Cruz", "Farfán", "Arias", "Burgos",
];

/// Topônimos: províncias, cidades e países.
pub const LOCATIONS: &[&str] = &[
    "Argentina", "Bolivia", "Chile", "Paraguay", "Uruguay", "Brasil", "Perú",
    "España", "México", "Buenos Aires", "Córdoba", "Rosario", "Mendoza",
    "Tucumán", "Salta", "Jujuy", "San Salvador de Jujuy", "Palpalá", "Perico",
    "San Pedro", "Libertador General San Martín", "Humahuaca", "Tilcara",
    "Purmamarca", "Maimará", "La Quiaca", "Abra Pampa", "El Carmen", "Monterrico",
    "Yala", "Volcán", "Susques", "Santa Catalina", "Yavi", "Catamarca",
    "Santiago del Estero", "La Rioja", "San Juan", "San Luis", "Neuquén",
    "Río Negro", "Chubut", "Santa Cruz", "Tierra del Fuego", "Misiones",
    "Corrientes", "Entre Ríos", "Santa Fe", "Chaco", "Formosa", "La Pampa",
    "Mar del Plata", "La Plata", "Bahía Blanca", "Quebrada de Humahuaca",
];

/// Organizações conhecidas (podem ter várias palavras).
pub const ORGANIZATIONS: &[&str] = &[
    "Poder Judicial de Jujuy", "Poder Judicial", "Superior Tribunal de Justicia",
    "Ministerio Público de la Acusación", "Ministerio Público Fiscal",
    "Policía de la Provincia", "Policía Federal Argentina", "Gendarmería Nacional",
    "ANSES", "AFIP", "ARCA", "PAMI", "RENAPER", "Registro Civil",
    "Banco Macro", "Banco Nación", "Banco Galicia", "Banco Santander",
    "Universidad Nacional de Jujuy", "UNJu", "Ledesma S.A.A.I.", "YPF",
    "Aerolíneas Argentinas", "Correo Argentino", "INLAB",
];

/// Leis, códigos e afins: reconhecidos como MISC e nunca anonimizados.
pub const MISC: &[&str] = &[
    "Código Penal", "Código Civil y Comercial", "Código Procesal Penal",
    "Constitución Nacional", "Constitución Provincial", "Boletín Oficial",
];

/// Títulos e papéis processuais que precedem nomes de pessoas (formas normalizadas).
pub const PERSON_TITLES: &[&str] = &[
    "sr", "sra", "srta", "señor", "señora", "señorita", "don", "doña", "dr", "dra",
    "doctor", "doctora", "lic", "licenciado", "licenciada", "ing", "ingeniero",
    "ingeniera", "prof", "profesor", "profesora", "cdor", "cra", "esc", "juez",
    "jueza", "fiscal", "defensor", "defensora", "abogado", "abogada", "imputado",
    "imputada", "testigo", "denunciante", "damnificado", "damnificada", "actor",
    "actora", "demandado", "demandada", "menor", "causante", "gral", "cnel", "tte",
    "sgto", "comisario", "oficial", "agente",
];

/// Palavras que abrem o nome de uma organização ("Juzgado de Control Nº 2").
pub const ORG_HEADS: &[&str] = &[
    "juzgado", "tribunal", "cámara", "ministerio", "fiscalía", "defensoría",
    "secretaría", "municipalidad", "comisión", "dirección", "policía", "banco",
    "universidad", "escuela", "colegio", "hospital", "clínica", "sanatorio",
    "empresa", "cooperativa", "asociación", "fundación", "club", "sindicato",
    "instituto", "registro", "superintendencia", "consejo", "concejo", "legislatura",
];

/// Conectores permitidos dentro de nomes compostos de organização/lugar.
pub const CONNECTORS: &[&str] = &["de", "del", "la", "las", "los", "y", "e"];

/// Sufixos societários ("Transportes Norte S.R.L.").
pub const COMPANY_SUFFIXES: &[&str] = &[
    "s.a", "sa", "s.r.l", "srl", "s.a.s", "sas", "s.a.a.i", "s.h", "sociedad",
    "ltda", "inc", "corp",
];

/// Palavras-chave de via pública: seus complementos ficam para o passo de endereço.
pub const STREET_KEYWORDS: &[&str] = &["calle", "av", "avda", "avenida", "ruta", "pasaje", "pje"];

/// Palavras que aparecem capitalizadas mas nunca são entidades.
pub const NON_ENTITY_WORDS: &[&str] = &[
    // artigos, preposições, pronomes e conectivos em início de frase
    "el", "la", "los", "las", "un", "una", "unos", "unas", "y", "o", "en", "de",
    "del", "al", "a", "por", "para", "con", "sin", "sobre", "entre", "desde",
    "hasta", "que", "se", "su", "sus", "lo", "le", "les", "este", "esta", "estos",
    "estas", "ese", "esa", "esos", "esas", "aquel", "mi", "tu", "yo", "él", "ella",
    "ellos", "nosotros", "no", "si", "sí", "como", "cuando", "donde", "pero",
    "también", "luego", "asimismo", "atento", "visto", "considerando", "resuelve",
    // identificadores e abreviações documentais
    "dni", "cuil", "cuit", "le", "lc", "nro", "nº", "n", "cp", "tel", "cel",
    "email", "e-mail", "correo", "teléfono", "domicilio", "expte", "fs", "art",
    "inc", "pág", "etc",
    // vocabulário judicial habitualmente capitalizado
    "expediente", "autos", "causa", "sentencia", "resolución", "auto", "decreto",
    "artículo", "ley", "código", "juez", "fiscal", "provincia", "nación",
    "república", "estado", "excelentísimo", "vs", "c",
    // datas
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
    "septiembre", "setiembre", "octubre", "noviembre", "diciembre", "lunes",
    "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
    // saudações e fechos
    "hola", "buenos", "buenas", "saludos", "saludo", "atentamente", "cordialmente",
    "gracias", "estimado", "estimada", "estimados", "estimadas", "querido", "querida",
    "bienvenidos", "bienvenido", "adiós", "muy",
    // vias públicas
    "calle", "av", "avda", "avenida", "ruta", "pasaje", "pje", "barrio", "bº",
];

/// Sufixo comum a todos os placeholders inseridos pelo pipeline.
pub const PLACEHOLDER_SUFFIXES: &[&str] = &["_ANONIMIZADO", "_ANONIMIZADA"];

/// Verifica se o texto é um placeholder já inserido ("PER_ANONIMIZADO").
pub fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER_SUFFIXES.iter().any(|suffix| text.ends_with(suffix))
}

/// Textos de demonstração para o servidor web.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Denuncia",
            "En San Salvador de Jujuy, la Sra. María Gómez, DNI 28.456.789, con domicilio en Calle Belgrano 1250, denuncia que el día 3 de marzo recibió amenazas telefónicas. Puede ser contactada al correo maria.gomez@correo.com.ar.",
        ),
        (
            "Sentencia",
            "El Juzgado de Control Nº 2 del Poder Judicial de Jujuy resuelve condenar al imputado Carlos Alberto Romero, domiciliado en Av. Fascio 830 de Palpalá, conforme al artículo 79 del Código Penal.",
        ),
        (
            "Contrato",
            "Entre Transportes Quebrada S.R.L., representada por el Lic. Facundo Ríos, y el Sr. Jorge Mamaní, DNI 30123456, se celebra el presente contrato. Notificaciones: Pasaje Lavalle 45, Humahuaca.",
        ),
        (
            "Sin datos personales",
            "La audiencia fue postergada por razones de agenda. Las partes serán notificadas oportunamente de la nueva fecha.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder("PER_ANONIMIZADO"));
        assert!(is_placeholder("DIRECCION_ANONIMIZADA"));
        assert!(!is_placeholder("ANONIMIZADO_PER"));
        assert!(!is_placeholder("Pérez"));
    }

    #[test]
    fn test_normalized_lists_are_lowercase() {
        for list in [PERSON_TITLES, ORG_HEADS, CONNECTORS, COMPANY_SUFFIXES, STREET_KEYWORDS, NON_ENTITY_WORDS] {
            for word in list {
                assert_eq!(*word, word.to_lowercase(), "{word} deveria estar normalizada");
            }
        }
    }
}
