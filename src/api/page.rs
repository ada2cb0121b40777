//! The chat page
//!
//! Server-rendered shell; the script only forwards clicks, typed text and
//! browser capabilities (speech, microphone, geolocation) to the API.

use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; margin: 0; background: #f4f7fb; }
main { max-width: 640px; margin: 0 auto; padding: 1rem; }
header { display: flex; align-items: center; gap: .5rem; }
header .toggles { margin-left: auto; display: flex; gap: .25rem; }
#mascot { font-size: 2.5rem; cursor: pointer; background: none; border: 0; }
#chat { background: #fff; border-radius: 12px; padding: .75rem; min-height: 50vh; overflow-y: auto; }
.msg { margin: .4rem 0; padding: .5rem .75rem; border-radius: 10px; max-width: 85%; }
.msg.user { background: #dbeafe; margin-left: auto; }
.msg.bot { background: #f1f5f9; }
.menu { display: grid; grid-template-columns: repeat(3, 1fr); gap: 6px; }
.quiz-options { display: flex; flex-direction: column; gap: 4px; margin-top: .4rem; }
pre.report { white-space: pre-wrap; margin: 0; }
#typing { visibility: hidden; color: #64748b; font-size: .9rem; }
#typing.on { visibility: visible; }
form { display: flex; gap: .4rem; margin-top: .5rem; }
form textarea { flex: 1; padding: .5rem; resize: vertical; font: inherit; }
";

const SCRIPT: &str = r#"
const chat = document.getElementById('chat');
const typing = document.getElementById('typing');
const post = (path, body) => fetch(path, {
  method: 'POST',
  headers: { 'Content-Type': 'application/json' },
  body: JSON.stringify(body || {}),
});

async function refresh() {
  const res = await fetch('/api/chat/render');
  chat.innerHTML = await res.text();
  chat.scrollTop = chat.scrollHeight;
}

chat.addEventListener('click', (e) => {
  const button = e.target.closest('button');
  if (!button) return;
  if (button.dataset.command) post('/api/chat/command', { command: button.dataset.command });
  if (button.dataset.option !== undefined) post('/api/chat/quiz', { option: Number(button.dataset.option) });
});

const composer = document.getElementById('composer');
const input = document.getElementById('text');
composer.addEventListener('submit', (e) => {
  e.preventDefault();
  const text = input.value.trim();
  if (!text) return;
  input.value = '';
  post('/api/chat', { text });
});
// Enter sends; Shift+Enter starts a new line
input.addEventListener('keydown', (e) => {
  if (e.key === 'Enter' && !e.shiftKey) {
    e.preventDefault();
    composer.requestSubmit();
  }
});

document.querySelectorAll('[data-toggle]').forEach((b) =>
  b.addEventListener('click', () => post('/api/chat/toggle', { target: b.dataset.toggle })));
document.getElementById('menu').addEventListener('click', () => post('/api/chat/command', { command: 'show_menu' }));
document.getElementById('mascot').addEventListener('click', () => post('/api/chat/mascot'));

const Ctx = window.AudioContext || window.webkitAudioContext;
const audio = Ctx ? new Ctx() : null;
let ambient = null;
let musicOn = true;

function startAmbient() {
  if (!audio || ambient) return;
  const gain = audio.createGain();
  gain.gain.value = 0;
  gain.connect(audio.destination);
  const mix = audio.createGain();
  mix.gain.value = 0.5;
  mix.connect(gain);
  [['sine', 220], ['triangle', 110]].forEach(([type, freq]) => {
    const osc = audio.createOscillator();
    osc.type = type;
    osc.frequency.value = freq;
    osc.connect(mix);
    osc.start();
  });
  ambient = gain;
}

function setMusic(playing) {
  musicOn = playing;
  document.body.dataset.music = playing ? 'on' : 'off';
  if (!audio) return;
  startAmbient();
  if (audio.state === 'suspended') audio.resume();
  ambient.gain.setTargetAtTime(playing ? 0.03 : 0, audio.currentTime, 0.05);
}

// Browsers only allow audio after a user gesture
document.addEventListener('click', () => setMusic(musicOn), { once: true });

function tone(freqs, seconds) {
  if (!audio) return;
  const ctx = audio;
  const osc = ctx.createOscillator();
  const gain = ctx.createGain();
  gain.gain.value = 0.1;
  osc.connect(gain).connect(ctx.destination);
  freqs.forEach((f, i) => osc.frequency.setValueAtTime(f, ctx.currentTime + i * seconds / freqs.length));
  osc.start();
  osc.stop(ctx.currentTime + seconds);
}

const mic = document.getElementById('mic');
mic.addEventListener('click', () => {
  const Recognition = window.SpeechRecognition || window.webkitSpeechRecognition;
  if (!Recognition) { post('/api/chat/microphone', { status: 'unsupported' }); return; }
  const rec = new Recognition();
  rec.onresult = (e) => post('/api/chat', { text: e.results[0][0].transcript });
  rec.onerror = () => post('/api/chat/microphone', { status: 'failed' });
  post('/api/chat/microphone', { status: 'listening' });
  rec.start();
});

const voiceSelect = document.getElementById('voice');
let voiceName = null;
function populateVoices() {
  if (!('speechSynthesis' in window)) return;
  const voices = speechSynthesis.getVoices();
  voiceSelect.innerHTML = '';
  voices.forEach((v) => {
    const opt = document.createElement('option');
    opt.value = v.name;
    opt.textContent = `${v.name} (${v.lang})`;
    voiceSelect.appendChild(opt);
  });
  const prefer = voices.find((v) => /en-?in|prabhat|kumar|nirmal/i.test(`${v.name} ${v.lang}`)) || voices[0];
  if (prefer) { voiceName = prefer.name; voiceSelect.value = voiceName; }
}
if ('speechSynthesis' in window) {
  populateVoices();
  speechSynthesis.onvoiceschanged = populateVoices;
}
voiceSelect.addEventListener('change', (e) => { voiceName = e.target.value; });

const events = new EventSource('/api/chat/stream');
events.addEventListener('init', (e) => {
  musicOn = JSON.parse(e.data).session.music_playing;
  document.body.dataset.music = musicOn ? 'on' : 'off';
  refresh();
});
events.addEventListener('message', () => { typing.classList.remove('on'); refresh(); });
events.addEventListener('typing', () => typing.classList.add('on'));
events.addEventListener('speak', (e) => {
  if (!('speechSynthesis' in window)) return;
  const cue = JSON.parse(e.data);
  const u = new SpeechSynthesisUtterance(cue.text);
  u.lang = cue.locale; u.rate = cue.rate; u.pitch = cue.pitch;
  // The picked voice only applies while its language matches the cue
  const voice = speechSynthesis.getVoices().find((v) => v.name === voiceName);
  if (voice && voice.lang.replace('_', '-').slice(0, 2) === cue.locale.slice(0, 2)) u.voice = voice;
  speechSynthesis.speak(u);
});
events.addEventListener('sound', (e) => {
  const { sound } = JSON.parse(e.data);
  if (sound === 'clap') tone([660, 880], 0.3);
  if (sound === 'siren') tone([880, 440, 880, 440], 1.2);
});
events.addEventListener('music', (e) => setMusic(JSON.parse(e.data).playing));
events.addEventListener('location_request', () => {
  if (!navigator.geolocation) { post('/api/chat/location', { error: 'unsupported' }); return; }
  navigator.geolocation.getCurrentPosition(
    (p) => post('/api/chat/location', { latitude: p.coords.latitude, longitude: p.coords.longitude }),
    () => post('/api/chat/location', { error: 'denied' }),
  );
});
events.addEventListener('error', (e) => { if (e.data) console.warn(JSON.parse(e.data).message); });
"#;

pub fn chat_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Brave Buddy" }
                style { (PreEscaped(STYLE)) }
            }
            body data-music="on" {
                main {
                    header {
                        button #mascot type="button" title="Brave Buddy" { "🦁" }
                        h1 { "Brave Buddy" }
                        div.toggles {
                            button #menu type="button" title="Menu" { "☰" }
                            button type="button" data-toggle="voice" title="Voice" { "🔊" }
                            button type="button" data-toggle="music" title="Music" { "🎵" }
                            button type="button" data-toggle="language" title="Language" { "EN/हिं" }
                            select #voice title="Voice" {}
                        }
                    }
                    div #chat {}
                    div #typing { "Typing..." }
                    form #composer {
                        textarea #text rows="2" autocomplete="off"
                            placeholder="Type here... (Shift+Enter for a new line)" {}
                        button #mic type="button" title="Speak" { "🎤" }
                        button type="submit" { "Send" }
                    }
                }
                script { (PreEscaped(SCRIPT)) }
            }
        }
    }
}
