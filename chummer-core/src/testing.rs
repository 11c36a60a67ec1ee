//! Testing utilities.
//!
//! This module provides deterministic fixtures for tests and demos:
//! - Small in-memory rule-data documents and a registry holding them
//! - `ScriptedPrompt`, which answers prompts from a script and records them

use crate::config::Settings;
use crate::context::RulesContext;
use crate::language::LanguageManager;
use crate::prompt::{ConfirmPrompt, NumberPrompt, NumberRequest, SavePrompt};
use crate::templates::{
    TemplateRegistry, COMPLEX_FORMS_FILE, CRITTERS_FILE, CRITTER_POWERS_FILE, GEAR_FILE,
    QUALITIES_FILE, STREAMS_FILE, TRADITIONS_FILE, WEAPONS_FILE,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

pub const WEAPONS_XML: &str = r#"<chummer>
  <weapons>
    <weapon>
      <name>Ares Desert Strike</name>
      <category>Sniper Rifles</category>
      <type>Ranged</type>
      <conceal>8</conceal>
      <accuracy>7</accuracy>
      <damage>13P</damage>
      <ap>-6</ap>
      <mode>SA</mode>
      <ammo>14(c)</ammo>
      <avail>10F</avail>
      <cost>17500</cost>
      <source>SR5</source>
      <page>428</page>
      <accessories>
        <accessory>
          <name>Imaging Scope</name>
          <mount>Top</mount>
        </accessory>
      </accessories>
    </weapon>
    <weapon>
      <name>Ares Predator V</name>
      <category>Heavy Pistols</category>
      <type>Ranged</type>
      <accuracy>5</accuracy>
      <damage>8P</damage>
      <ap>-1</ap>
      <mode>SA</mode>
      <ammo>15(c)</ammo>
      <avail>5R</avail>
      <cost>725</cost>
      <source>SR5</source>
      <page>425</page>
    </weapon>
    <weapon>
      <name>Unarmed Attack</name>
      <category>Unarmed</category>
      <type>Melee</type>
      <reach>0</reach>
      <damage>(STR)S</damage>
      <avail>0</avail>
      <cost>0</cost>
      <source>SR5</source>
      <page>132</page>
    </weapon>
  </weapons>
  <accessories>
    <accessory>
      <name>Smartgun System, Internal</name>
      <mount>Internal</mount>
      <avail>2R</avail>
      <cost>Weapon Cost * 0.1</cost>
      <accuracy>2</accuracy>
      <source>SR5</source>
      <page>433</page>
    </accessory>
    <accessory>
      <name>Bipod</name>
      <mount>Under</mount>
      <rc>2</rc>
      <rcdeployable>True</rcdeployable>
      <rcgroup>1</rcgroup>
      <avail>2</avail>
      <cost>200</cost>
      <source>SR5</source>
      <page>431</page>
      <translate>Zweibein</translate>
      <altpage>181</altpage>
    </accessory>
    <accessory>
      <name>Imaging Scope</name>
      <mount>Top</mount>
      <avail>2</avail>
      <cost>350</cost>
      <source>SR5</source>
      <page>432</page>
      <allowgear>
        <gearcategory>Vision Enhancements</gearcategory>
      </allowgear>
      <gears>
        <usegear>
          <name>Vision Magnification</name>
          <category>Vision Enhancements</category>
        </usegear>
      </gears>
    </accessory>
    <accessory>
      <name>Concealable Holster</name>
      <conceal>-1</conceal>
      <avail>2</avail>
      <cost>150</cost>
      <source>SR5</source>
      <page>432</page>
    </accessory>
    <accessory>
      <name>Customized Grip</name>
      <avail>4</avail>
      <cost>Variable(100-500)</cost>
      <source>RG</source>
      <page>52</page>
    </accessory>
    <accessory>
      <name>Ceramic/Plasteel Components</name>
      <rating>6</rating>
      <conceal>-Rating</conceal>
      <avail>(Rating * 2)F</avail>
      <cost>Weapon Cost * 0.1 * Rating</cost>
      <source>RG</source>
      <page>49</page>
    </accessory>
    <accessory>
      <name>Custom Look</name>
      <avail>6</avail>
      <cost>500</cost>
      <accessorycostmultiplier>2</accessorycostmultiplier>
      <source>RG</source>
      <page>50</page>
    </accessory>
  </accessories>
</chummer>"#;

pub const GEAR_XML: &str = r#"<chummer>
  <gears>
    <gear>
      <name>Smartlink</name>
      <category>Vision Enhancements</category>
      <rating>0</rating>
      <capacity>[1]</capacity>
      <avail>4R</avail>
      <cost>500</cost>
      <source>SR5</source>
      <page>444</page>
    </gear>
    <gear>
      <name>Vision Magnification</name>
      <category>Vision Enhancements</category>
      <capacity>[1]</capacity>
      <avail>2</avail>
      <cost>250</cost>
      <source>SR5</source>
      <page>444</page>
    </gear>
    <gear>
      <name>Meta Link</name>
      <category>Commlinks</category>
      <devicerating>1</devicerating>
      <avail>2</avail>
      <cost>100</cost>
      <source>SR5</source>
      <page>438</page>
    </gear>
    <gear>
      <name>Survival Kit</name>
      <category>Survival Gear</category>
      <avail>4</avail>
      <cost>200</cost>
      <source>SR5</source>
      <page>450</page>
      <gears>
        <usegear>
          <name qty="2">Flashlight</name>
          <category>Survival Gear</category>
          <capacity>1</capacity>
        </usegear>
        <usegear>
          <name select="Rations" createchildren="no">Food Ration</name>
          <category>Survival Gear</category>
          <rating>1</rating>
          <source>SR5</source>
          <page>450</page>
        </usegear>
      </gears>
    </gear>
    <gear>
      <name>Flashlight</name>
      <category>Survival Gear</category>
      <avail>0</avail>
      <cost>25</cost>
      <source>SR5</source>
      <page>450</page>
    </gear>
    <gear>
      <name>Food Ration</name>
      <category>Survival Gear</category>
      <rating>10</rating>
      <avail>0</avail>
      <cost>Rating * 5</cost>
      <source>SR5</source>
      <page>450</page>
      <gears>
        <usegear>
          <name>Flashlight</name>
          <category>Survival Gear</category>
        </usegear>
      </gears>
    </gear>
    <gear>
      <name>Medkit</name>
      <category>Biotech</category>
      <rating>6</rating>
      <avail>Rating</avail>
      <cost>Rating * 250</cost>
      <source>SR5</source>
      <page>450</page>
    </gear>
    <gear>
      <name>Agent</name>
      <category>Software</category>
      <rating>6</rating>
      <avail>Rating * 3</avail>
      <cost>Rating * 1000</cost>
      <source>SR5</source>
      <page>246</page>
    </gear>
  </gears>
</chummer>"#;

pub const CRITTERS_XML: &str = r#"<chummer>
  <metatypes>
    <metatype>
      <name>Spirit of Fire</name>
      <category>Spirits</category>
      <bodmin>F+1</bodmin>
      <agimin>F+2</agimin>
      <reamin>F+3</reamin>
      <strmin>F-2</strmin>
      <chamin>F</chamin>
      <intmin>F+1</intmin>
      <logmin>F</logmin>
      <wilmin>F</wilmin>
      <magmin>F</magmin>
      <edgmin>F/2</edgmin>
      <essmin>F</essmin>
      <essmax>F</essmax>
      <essaug>F</essaug>
      <movement>x2/x4/+15</movement>
      <qualities>
        <positive>
          <quality removable="True">Dual Natured</quality>
        </positive>
        <negative>
          <quality select="Water, Severe">Allergy</quality>
        </negative>
      </qualities>
      <powers>
        <power>Accident</power>
        <power select="Fire">Energy Aura</power>
      </powers>
      <optionalpowers>
        <optionalpower>Fear</optionalpower>
        <optionalpower>Guard</optionalpower>
      </optionalpowers>
      <source>SR5</source>
      <page>303</page>
    </metatype>
    <metatype>
      <name>Ally Spirit</name>
      <category>Spirits</category>
      <translate>Verbündeter Geist</translate>
      <bodmin>F-2</bodmin>
      <bodmax>F</bodmax>
      <bodaug>F+2</bodaug>
      <agimin>F-2</agimin>
      <agimax>F</agimax>
      <agiaug>F+2</agiaug>
      <reamin>F-2</reamin>
      <reamax>F</reamax>
      <reaaug>F+2</reaaug>
      <strmin>F-2</strmin>
      <strmax>F</strmax>
      <straug>F+2</straug>
      <chamin>F-2</chamin>
      <chamax>F</chamax>
      <chaaug>F+2</chaaug>
      <intmin>F-2</intmin>
      <intmax>F</intmax>
      <intaug>F+2</intaug>
      <logmin>F-2</logmin>
      <logmax>F</logmax>
      <logaug>F+2</logaug>
      <wilmin>F-2</wilmin>
      <wilmax>F</wilmax>
      <wilaug>F+2</wilaug>
      <magmin>F</magmin>
      <magmax>F</magmax>
      <magaug>F</magaug>
      <edgmin>1</edgmin>
      <edgmax>F/2</edgmax>
      <edgaug>F/2</edgaug>
      <essmin>F</essmin>
      <essmax>F</essmax>
      <essaug>F</essaug>
      <movement>x2/x4/+10</movement>
      <qualities>
        <positive>
          <quality>Dual Natured</quality>
        </positive>
      </qualities>
      <optionalpowers>
        <optionalpower>Guard</optionalpower>
      </optionalpowers>
    </metatype>
    <metatype>
      <name>Courier Sprite</name>
      <category>Sprites</category>
      <chamin>F</chamin>
      <intmin>F+1</intmin>
      <logmin>F</logmin>
      <resmin>F</resmin>
      <edgmin>F/2</edgmin>
      <essmin>F</essmin>
      <essmax>F</essmax>
      <essaug>F</essaug>
      <powers>
        <power>Hash</power>
      </powers>
      <complexforms>
        <complexform>Cookie</complexform>
      </complexforms>
      <gears>
        <gear rating="F">Agent</gear>
      </gears>
    </metatype>
    <metatype>
      <name>Data Sprite</name>
      <category>Sprites</category>
      <chamin>F-1</chamin>
      <intmin>F+2</intmin>
      <logmin>F+1</logmin>
      <resmin>F</resmin>
      <edgmin>F/2</edgmin>
      <essmin>F</essmin>
      <essmax>F</essmax>
      <essaug>F</essaug>
    </metatype>
  </metatypes>
</chummer>"#;

pub const CRITTER_POWERS_XML: &str = r#"<chummer>
  <powers>
    <power>
      <name>Accident</name>
      <category>Spirit</category>
      <type>P</type>
      <action>Complex</action>
      <range>LOS</range>
      <duration>Instant</duration>
      <source>SR5</source>
      <page>394</page>
    </power>
    <power>
      <name>Energy Aura</name>
      <category>Spirit</category>
      <type>P</type>
      <action>Auto</action>
      <range>Touch</range>
      <duration>Always</duration>
      <source>SR5</source>
      <page>396</page>
    </power>
    <power>
      <name>Fear</name>
      <category>Spirit</category>
      <type>M</type>
      <action>Complex</action>
      <range>LOS</range>
      <duration>Special</duration>
      <source>SR5</source>
      <page>397</page>
    </power>
    <power>
      <name>Guard</name>
      <category>Spirit</category>
      <type>P</type>
      <action>Complex</action>
      <range>LOS</range>
      <duration>Special</duration>
      <source>SR5</source>
      <page>397</page>
    </power>
    <power>
      <name>Hash</name>
      <category>Sprite</category>
      <type>P</type>
      <action>Complex</action>
      <range>Touch</range>
      <duration>Special</duration>
      <source>SR5</source>
      <page>258</page>
    </power>
  </powers>
</chummer>"#;

pub const QUALITIES_XML: &str = r#"<chummer>
  <qualities>
    <quality>
      <name>Dual Natured</name>
      <category>Positive</category>
      <karma>0</karma>
      <source>SR5</source>
      <page>398</page>
    </quality>
    <quality>
      <name>Allergy</name>
      <category>Negative</category>
      <karma>-5</karma>
      <source>SR5</source>
      <page>78</page>
    </quality>
  </qualities>
</chummer>"#;

pub const COMPLEX_FORMS_XML: &str = r#"<chummer>
  <complexforms>
    <complexform>
      <name>Cookie</name>
      <target>Persona</target>
      <duration>E</duration>
      <fv>L+1</fv>
      <source>DT</source>
      <page>59</page>
    </complexform>
  </complexforms>
</chummer>"#;

pub const TRADITIONS_XML: &str = r#"<chummer>
  <traditions>
    <tradition>
      <name>Hermetic</name>
      <spirits>
        <spiritcombat>Spirit of Fire</spiritcombat>
        <spiritdetection>Spirit of Air</spiritdetection>
        <spirithealth>Spirit of Man</spirithealth>
        <spiritillusion>Spirit of Air</spiritillusion>
        <spiritmanipulation>Spirit of Earth</spiritmanipulation>
      </spirits>
    </tradition>
  </traditions>
  <spirits>
    <spirit>
      <name>Spirit of Fire</name>
      <translate>Feuergeist</translate>
    </spirit>
    <spirit>
      <name>Spirit of Air</name>
    </spirit>
    <spirit>
      <name>Spirit of Man</name>
    </spirit>
    <spirit>
      <name>Spirit of Earth</name>
    </spirit>
  </spirits>
</chummer>"#;

pub const STREAMS_XML: &str = r#"<chummer>
  <traditions>
    <tradition>
      <name>Default</name>
      <spirits>
        <spirit>Courier Sprite</spirit>
        <spirit>Data Sprite</spirit>
      </spirits>
    </tradition>
  </traditions>
</chummer>"#;

/// A fresh in-memory registry holding every sample document.
pub fn sample_registry() -> TemplateRegistry {
    TemplateRegistry::in_memory()
        .with_document(WEAPONS_FILE, WEAPONS_XML)
        .with_document(GEAR_FILE, GEAR_XML)
        .with_document(CRITTERS_FILE, CRITTERS_XML)
        .with_document(CRITTER_POWERS_FILE, CRITTER_POWERS_XML)
        .with_document(QUALITIES_FILE, QUALITIES_XML)
        .with_document(COMPLEX_FORMS_FILE, COMPLEX_FORMS_XML)
        .with_document(TRADITIONS_FILE, TRADITIONS_XML)
        .with_document(STREAMS_FILE, STREAMS_XML)
}

/// English rules context over [`sample_registry`] with default settings.
pub fn sample_context() -> RulesContext {
    RulesContext::new(
        Arc::new(sample_registry()),
        Settings::new(),
        LanguageManager::english(),
    )
}

/// Answers prompts from scripted replies, in order.
///
/// When a script runs out the prompt is cancelled: `None` for numbers and
/// paths, `false` for confirmations.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    numbers: VecDeque<f64>,
    save_paths: VecDeque<PathBuf>,
    confirmations: VecDeque<bool>,
    number_requests: Vec<NumberRequest>,
    suggested_names: Vec<String>,
    confirm_titles: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numbers(mut self, numbers: impl IntoIterator<Item = f64>) -> Self {
        self.numbers.extend(numbers);
        self
    }

    pub fn with_save_paths<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.save_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_confirmations(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.confirmations.extend(answers);
        self
    }

    /// Every number request received so far.
    pub fn number_requests(&self) -> &[NumberRequest] {
        &self.number_requests
    }

    /// File names suggested by save prompts.
    pub fn suggested_names(&self) -> &[String] {
        &self.suggested_names
    }

    /// Titles of the confirmation questions asked.
    pub fn confirm_titles(&self) -> &[String] {
        &self.confirm_titles
    }
}

impl NumberPrompt for ScriptedPrompt {
    fn pick_number(&mut self, request: &NumberRequest) -> Option<f64> {
        self.number_requests.push(request.clone());
        self.numbers.pop_front()
    }
}

impl SavePrompt for ScriptedPrompt {
    fn pick_save_path(&mut self, suggested: &str) -> Option<PathBuf> {
        self.suggested_names.push(suggested.to_string());
        self.save_paths.pop_front()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&mut self, _message: &str, title: &str) -> bool {
        self.confirm_titles.push(title.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }
}
