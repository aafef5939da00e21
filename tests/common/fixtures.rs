//! Small plays with hand-checked statistics

use iarkho::{AdapterInput, Play, PlayEngine, TeiElement, PLAIN_TEXT_KIND, TEI_KIND};

/// Two acts, six scene entries:
///
/// | act | scene         | present            | speakers |
/// |-----|---------------|--------------------|----------|
/// | 1   | 1_regular     | OCTAVE SILVESTRE   | 2        |
/// | 1   | 2_regular     | + SCAPIN           | 3        |
/// | 1   | 3_no_change   | same, SCAPIN mute  | 2        |
/// | 1   | 3.1_extra     | SCAPIN             | 1        |
/// | 2   | 1_regular     | HYACINTHE PORTERS  | 1        |
/// | 2   | 2_regular     | SCAPIN             | 1        |
pub fn plain_text_play() -> String {
    "\
Les Fourberies de Scapin

DRAMATIC CHARACTERS
OCTAVE
SILVESTRE
– SCAPIN
HYACINTHE
PORTERS2

ACT 1
SCENE 1
OCTAVE
SILVESTRE
SCENE 2
OCTAVE
SILVESTRE
SCAPIN
SCENE 3*
OCTAVE
SILVESTRE
SCAPIN NON_SPEAKING
SCENE –
SCAPIN
ACT 2
SCENE 1
HYACINTHE
PORTERS NON_SPEAKING
SCENE 2
SCAPIN
"
    .to_string()
}

/// Two acts, no scene repeats its predecessor's cast
pub fn plain_text_without_no_change() -> String {
    "\
Le Malade imaginaire

DRAMATIC CHARACTERS
ARGAN
TOINETTE
ANGELIQUE

ACT 1
SCENE 1
ARGAN
SCENE 2
ARGAN
TOINETTE
SCENE 3
TOINETTE
ANGELIQUE
ARGAN NON_SPEAKING
ACT 2
SCENE 1
ANGELIQUE
SCENE 2
ARGAN
TOINETTE
ANGELIQUE
"
    .to_string()
}

/// Both acts open on an unchanged-cast marker:
///
/// | act | marker | scene       |
/// |-----|--------|-------------|
/// | 1   | 1*     | 1_regular   |
/// | 1   | 2*     | 2_no_change |
/// | 1   | 3      | 3_regular   |
/// | 2   | 1*     | 1_regular   |
pub fn plain_text_opening_unchanged() -> String {
    "\
Le Malade imaginaire

DRAMATIC CHARACTERS
ARGAN
TOINETTE
ANGELIQUE

ACT 1
SCENE 1*
ARGAN
TOINETTE
SCENE 2*
ARGAN
TOINETTE
SCENE 3
ANGELIQUE
ACT 2
SCENE 1*
ANGELIQUE
"
    .to_string()
}

fn person(id: &str) -> TeiElement {
    TeiElement::new("person").with_attribute("xml:id", id)
}

fn sp(who: &str) -> TeiElement {
    TeiElement::new("sp")
        .with_attribute("who", who)
        .with_child(TeiElement::new("p").with_text("..."))
}

fn cast_stage(ids: &str) -> TeiElement {
    TeiElement::new("stage")
        .with_attribute("type", "cast")
        .with_text(ids)
}

fn scene(kind: &str, children: Vec<TeiElement>) -> TeiElement {
    children.into_iter().fold(
        TeiElement::new("div").with_attribute("type", kind),
        TeiElement::with_child,
    )
}

/// One act:
///
/// | scene     | declared              | utterances                       |
/// |-----------|-----------------------|----------------------------------|
/// | 1_regular | hamlet horatio        | hamlet, hamlet+horatio           |
/// | 2_regular | hamlet horatio ghost  | ghost ×3                         |
/// | 2.1_extra | hamlet                | hamlet, horatio (undeclared)     |
pub fn tei_play() -> TeiElement {
    let header = TeiElement::new("teiHeader")
        .with_child(
            TeiElement::new("titleStmt")
                .with_child(TeiElement::new("title").with_text("Hamlet"))
                .with_child(TeiElement::new("author").with_text("William Shakespeare")),
        )
        .with_child(
            TeiElement::new("profileDesc").with_child(
                TeiElement::new("creation").with_child(
                    TeiElement::new("date")
                        .with_attribute("when", "1601")
                        .with_text("c. 1601"),
                ),
            ),
        );

    let cast = TeiElement::new("listPerson")
        .with_child(person("hamlet_1"))
        .with_child(person("horatio_1"))
        .with_child(person("ghost_1"));

    let act = TeiElement::new("div")
        .with_attribute("type", "act")
        .with_child(scene(
            "scene",
            vec![
                cast_stage("#hamlet_1 #horatio_1"),
                sp("#hamlet_1"),
                sp("#hamlet_1 #horatio_1"),
            ],
        ))
        .with_child(scene(
            "scene",
            vec![
                cast_stage("#hamlet_1, #horatio_1, #ghost_1"),
                sp("#ghost_1"),
                sp("#ghost_1"),
                sp("#ghost_1"),
            ],
        ))
        .with_child(scene(
            "extra_scene",
            vec![cast_stage("#hamlet_1"), sp("#hamlet_1"), sp("#horatio_1")],
        ));

    TeiElement::new("TEI")
        .with_child(header)
        .with_child(
            TeiElement::new("text").with_child(
                TeiElement::new("body")
                    .with_child(cast)
                    .with_child(act),
            ),
        )
}

pub fn analyze_plain(text: &str) -> Play {
    let engine = PlayEngine::default();
    let input = AdapterInput::new(PLAIN_TEXT_KIND, text.to_string(), "fixture.txt");
    engine
        .process(&engine.router(), &input)
        .expect("plain-text fixture should analyze")
}

pub fn analyze_tei(root: TeiElement) -> Play {
    let engine = PlayEngine::default();
    let input = AdapterInput::new(TEI_KIND, root, "fixture.xml");
    engine
        .process(&engine.router(), &input)
        .expect("TEI fixture should analyze")
}
